// ============================================================
// Layer 2 — FilterUseCase
// ============================================================
// Keeps only the rows a pretrained classifier marks as safe:
//
//   Step 1: Load and concatenate the inputs      (Layer 4 - data)
//   Step 2: Load the classifier                  (Layer 5 - ml)
//   Step 3: Flag every row                       (Layer 3 - traits)
//   Step 4: Keep rows flagged with the safe class
//   Step 5: Write the filtered table             (Layer 4 - data)
//
// Blank or non-string text never reaches the model; it is
// flagged with SENTINEL_CLASS instead.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    loader::{write_csv, DelimitedLoader},
    preprocessor::Preprocessor,
};
use crate::domain::{
    error::PrepError,
    table::{Column, Table},
    traits::{TableSource, TextClassifier},
};
use crate::infra::checkpoint::ModelStore;
use crate::ml::classifier::{BurnClassifier, DEFAULT_MAX_LEN};

/// Flag given to rows with no usable text.
pub const SENTINEL_CLASS: i64 = -1;

/// Class index the default model uses for non-violating text.
pub const DEFAULT_SAFE_CLASS: i64 = 0;

// ─── Filter Configuration ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub inputs:      Vec<String>,
    pub output:      String,
    pub model_dir:   String,
    pub text_column: String,
    pub flag_column: String,
    pub safe_class:  i64,
    pub max_len:     usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            inputs:      vec!["datasets/table3/combined_cleaned_table3.csv".to_string()],
            output:      "datasets/filtered/filtered_table_3_data.csv".to_string(),
            model_dir:   "models/classifier".to_string(),
            text_column: "Text".to_string(),
            flag_column: "is_hate".to_string(),
            safe_class:  DEFAULT_SAFE_CLASS,
            max_len:     DEFAULT_MAX_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub rows_in:   usize,
    pub sentinel:  usize,
    pub rows_kept: usize,
}

/// Flag each row through `classifier`, append the flag column,
/// then keep only rows flagged with the safe class.
pub fn flag_and_filter<C: TextClassifier + ?Sized>(
    table:      &mut Table,
    classifier: &mut C,
    config:     &FilterConfig,
) -> Result<FilterSummary> {
    let preprocessor = Preprocessor::new();
    let texts = table.require_column(&config.text_column)?;
    let rows_in = texts.len();

    let mut flags    = Vec::with_capacity(rows_in);
    let mut sentinel = 0usize;

    for (i, value) in texts.values.iter().enumerate() {
        let flag = match value.as_text() {
            Some(text) if !preprocessor.is_blank(text) => classifier.classify(text)?,
            _ => {
                sentinel += 1;
                SENTINEL_CLASS
            }
        };
        flags.push(flag);

        if (i + 1) % 1000 == 0 {
            tracing::debug!("Classified {}/{} rows", i + 1, rows_in);
        }
    }

    let keep: Vec<bool> = flags.iter().map(|f| *f == config.safe_class).collect();
    table.push_column(Column::int(config.flag_column.clone(), flags))?;
    table.retain_rows(&keep)?;

    Ok(FilterSummary { rows_in, sentinel, rows_kept: table.row_count() })
}

// ─── FilterUseCase ────────────────────────────────────────────────────────────
pub struct FilterUseCase {
    config: FilterConfig,
}

impl FilterUseCase {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<FilterSummary> {
        let cfg = &self.config;

        if cfg.inputs.is_empty() {
            return Err(PrepError::InvalidConfig("no input files given".into()).into());
        }

        // ── Step 1: Load inputs ──────────────────────────────────────────────
        let mut tables = Vec::with_capacity(cfg.inputs.len());
        for input in &cfg.inputs {
            tables.push(DelimitedLoader::csv(input).load()?);
        }
        let mut table = Table::concat(tables);
        tracing::info!("Loaded {} rows from {} files", table.row_count(), cfg.inputs.len());

        // ── Step 2: Classifier ───────────────────────────────────────────────
        let mut classifier = BurnClassifier::from_store(&ModelStore::new(&cfg.model_dir), cfg.max_len)?;

        // ── Steps 3–4: Flag and filter ───────────────────────────────────────
        let summary = flag_and_filter(&mut table, &mut classifier, cfg)?;
        tracing::info!(
            "Kept {} of {} rows ({} without usable text)",
            summary.rows_kept,
            summary.rows_in,
            summary.sentinel
        );

        // ── Step 5: Write ────────────────────────────────────────────────────
        write_csv(&table, Path::new(&cfg.output))?;
        Ok(summary)
    }
}
