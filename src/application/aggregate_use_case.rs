// ============================================================
// Layer 2 — AggregateUseCase
// ============================================================
// Merges a directory of tab-separated tweet files into one
// comma-separated table:
//
//   Step 1: List input files (sorted, output excluded)
//   Step 2: Tolerant parse + drop incomplete rows, per file
//   Step 3: Concatenate the survivors
//   Step 4: Write the combined table into the same directory
//
// A file that cannot be read is logged and skipped; it never
// stops the other files from being merged.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::loader::{write_csv, DelimitedLoader};
use crate::domain::{error::PrepError, table::Table, traits::TableSource};

// ─── Aggregate Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateConfig {
    pub dir:          String,
    /// File name of the combined table, written inside `dir`
    pub output:       String,
    pub extension:    String,
    pub text_column:  String,
    pub class_column: String,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            dir:          "datasets/table3".to_string(),
            output:       "combined_cleaned_table3.csv".to_string(),
            extension:    "csv".to_string(),
            text_column:  "Text".to_string(),
            class_column: "Class".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    pub processed:   Vec<String>,
    pub failed:      Vec<String>,
    pub rows:        usize,
    pub output_path: PathBuf,
}

// ─── AggregateUseCase ─────────────────────────────────────────────────────────
pub struct AggregateUseCase {
    config: AggregateConfig,
}

impl AggregateUseCase {
    pub fn new(config: AggregateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<AggregateSummary> {
        let cfg = &self.config;
        let dir = Path::new(&cfg.dir);

        // ── Step 1: Input files ──────────────────────────────────────────────
        let files = self.input_files(dir)?;
        tracing::info!("Found {} input files in '{}'", files.len(), cfg.dir);

        // ── Step 2: Parse each file on its own ───────────────────────────────
        let mut tables    = Vec::new();
        let mut processed = Vec::new();
        let mut failed    = Vec::new();

        for path in &files {
            let name = file_name(path);
            match self.load_file(path) {
                Ok(table) => {
                    tracing::info!("Processed file: {}", name);
                    tables.push(table);
                    processed.push(name);
                }
                Err(e) => {
                    tracing::warn!("Error processing file {}: {:#}", name, e);
                    failed.push(name);
                }
            }
        }

        if tables.is_empty() {
            return Err(PrepError::EmptyInput(format!(
                "no readable files in '{}'",
                cfg.dir
            ))
            .into());
        }

        // ── Step 3: Concatenate ──────────────────────────────────────────────
        let combined = Table::concat(tables);

        // ── Step 4: Write ────────────────────────────────────────────────────
        let output_path = dir.join(&cfg.output);
        write_csv(&combined, &output_path)?;
        tracing::info!(
            "Combined {} rows into '{}'",
            combined.row_count(),
            output_path.display()
        );

        Ok(AggregateSummary {
            processed,
            failed,
            rows: combined.row_count(),
            output_path,
        })
    }

    /// Matching files in name order, never the output itself.
    fn input_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let cfg = &self.config;
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
        {
            let path = entry?.path();
            let matches = path.is_file()
                && path.extension().is_some_and(|ext| ext == cfg.extension.as_str())
                && path.file_name().is_some_and(|n| n != cfg.output.as_str());
            if matches {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn load_file(&self, path: &Path) -> Result<Table> {
        let cfg = &self.config;
        let mut table = DelimitedLoader::tolerant_tsv(path).load()?;
        let dropped = table.drop_rows_missing(&[&cfg.text_column, &cfg.class_column])?;
        if dropped > 0 {
            tracing::debug!("Dropped {} incomplete rows from '{}'", dropped, path.display());
        }
        Ok(table)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &Path) -> AggregateConfig {
        AggregateConfig {
            dir: dir.display().to_string(),
            ..AggregateConfig::default()
        }
    }

    #[test]
    fn test_good_file_merged_corrupted_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a_good.csv"),
            "Text\tClass\nfirst tweet\t0\n\t1\nsecond tweet\t\nthird tweet\t2\n",
        )
        .unwrap();

        let mut corrupted = b"Text\tClass\n".to_vec();
        corrupted.extend_from_slice(&[0xff, 0xfe, b'\t', b'1', b'\n']);
        fs::write(dir.path().join("b_bad.csv"), corrupted).unwrap();

        let summary = AggregateUseCase::new(config_for(dir.path())).execute().unwrap();
        assert_eq!(summary.processed, vec!["a_good.csv".to_string()]);
        assert_eq!(summary.failed, vec!["b_bad.csv".to_string()]);
        assert_eq!(summary.rows, 2);

        let written = fs::read_to_string(&summary.output_path).unwrap();
        assert_eq!(written, "Text,Class\nfirst tweet,0\nthird tweet,2\n");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tweets.csv"),
            "Text\tClass\nok\t1\ntoo\tmany\tfields\n\"unbalanced quote\t0\n",
        )
        .unwrap();

        let summary = AggregateUseCase::new(config_for(dir.path())).execute().unwrap();
        assert_eq!(summary.rows, 2);
    }

    #[test]
    fn test_output_and_other_extensions_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tweets.csv"), "Text\tClass\nhello\t0\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "Text\tClass\nskip me\t0\n").unwrap();
        fs::write(
            dir.path().join("combined_cleaned_table3.csv"),
            "Text,Class\nstale,9\n",
        )
        .unwrap();

        let summary = AggregateUseCase::new(config_for(dir.path())).execute().unwrap();
        assert_eq!(summary.processed, vec!["tweets.csv".to_string()]);
        assert_eq!(summary.rows, 1);
    }

    #[test]
    fn test_file_without_class_column_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "Text\nno class here\n").unwrap();
        fs::write(dir.path().join("b.csv"), "Text\tClass\nkept\t1\n").unwrap();

        let summary = AggregateUseCase::new(config_for(dir.path())).execute().unwrap();
        assert_eq!(summary.failed, vec!["a.csv".to_string()]);
        assert_eq!(summary.rows, 1);
    }

    #[test]
    fn test_no_readable_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "Text\nonly text\n").unwrap();
        let err = AggregateUseCase::new(config_for(dir.path())).execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<PrepError>(), Some(PrepError::EmptyInput(_))));
    }
}
