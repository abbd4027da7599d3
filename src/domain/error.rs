//! Error types shared by every pipeline stage

use thiserror::Error;

/// Failures a stage can report before anything is written to disk.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("label '{value}' in data row {row} has no numeric encoding")]
    UnmappedLabel { value: String, row: usize },

    #[error("data row {row} has {fields} fields but the header has {expected}")]
    RaggedRow { row: usize, fields: usize, expected: usize },

    #[error("no usable rows: {0}")]
    EmptyInput(String),

    #[error("expected {expected} values but got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for domain and data operations
pub type Result<T> = std::result::Result<T, PrepError>;
