// ============================================================
// Layer 2 — StanceUseCase
// ============================================================
// Prepares a labelled stance dataset for training:
//
//   Step 1: Load the stance CSV                 (Layer 4 - data)
//   Step 2: Drop the excluded category          (Layer 3 - domain)
//   Step 3: Encode labels as {-1, 0, 1}         (Layer 3 - domain)
//   Step 4: Stratified 70 / 15 / 15 split       (Layer 4 - data)
//   Step 5: Write train / validation / test     (Layer 4 - data)
//
// Nothing is written unless every step succeeds.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    loader::{write_csv_all, DelimitedLoader},
    splitter::{split_three_way, SplitConfig},
};
use crate::domain::{
    error::PrepError,
    stance::{LabelMap, DEFAULT_EXCLUDED},
    table::{Column, Table},
    traits::TableSource,
};

// ─── Stance Configuration ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceConfig {
    pub input:        String,
    pub train_out:    String,
    pub val_out:      String,
    pub test_out:     String,
    pub label_column: String,
    pub excluded:     String,
    pub label_map:    LabelMap,
    pub split:        SplitConfig,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            input:        "train_stances.csv".to_string(),
            train_out:    "fnc_train.csv".to_string(),
            val_out:      "fnc_validation.csv".to_string(),
            test_out:     "fnc_test.csv".to_string(),
            label_column: "Stance".to_string(),
            excluded:     DEFAULT_EXCLUDED.to_string(),
            label_map:    LabelMap::fnc(),
            split:        SplitConfig::default(),
        }
    }
}

/// The three disjoint partitions of the normalised table.
#[derive(Debug, Clone, PartialEq)]
pub struct StancePartitions {
    pub train:      Table,
    pub validation: Table,
    pub test:       Table,
}

/// Row counts reported once the files are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StanceSummary {
    pub excluded:   usize,
    pub train:      usize,
    pub validation: usize,
    pub test:       usize,
}

/// Drop the excluded category, encode the rest, and split.
///
/// A label that is missing or has no encoding fails the whole
/// run with `UnmappedLabel`, naming the 1-based data row.
pub fn normalize_stances(mut table: Table, config: &StanceConfig) -> Result<(StancePartitions, usize)> {
    config.label_map.validate()?;
    let labels = table.require_column(&config.label_column)?;

    // ── Exclusion ────────────────────────────────────────────────────────────
    let keep: Vec<bool> = labels
        .values
        .iter()
        .map(|v| v.is_missing() || v.to_field() != config.excluded)
        .collect();

    let source_rows: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(i, k)| k.then_some(i))
        .collect();
    let excluded = keep.len() - source_rows.len();

    table.retain_rows(&keep)?;
    tracing::info!("Removed {} '{}' rows", excluded, config.excluded);

    // ── Remap ────────────────────────────────────────────────────────────────
    let labels = table.require_column(&config.label_column)?;
    let mut codes = Vec::with_capacity(labels.len());
    for (value, &row) in labels.values.iter().zip(&source_rows) {
        let code = value
            .as_text()
            .and_then(|s| config.label_map.encode(s))
            .ok_or_else(|| PrepError::UnmappedLabel {
                value: value.to_field(),
                row:   row + 1,
            })?;
        codes.push(code);
    }
    table.push_column(Column::int(config.label_column.clone(), codes.clone()))?;

    // ── Split ────────────────────────────────────────────────────────────────
    let indices = split_three_way(&codes, &config.split)?;

    let partitions = StancePartitions {
        train:      table.take_rows(&indices.train),
        validation: table.take_rows(&indices.validation),
        test:       table.take_rows(&indices.test),
    };
    Ok((partitions, excluded))
}

// ─── StanceUseCase ────────────────────────────────────────────────────────────
pub struct StanceUseCase {
    config: StanceConfig,
}

impl StanceUseCase {
    pub fn new(config: StanceConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<StanceSummary> {
        let cfg = &self.config;

        // ── Step 1: Load ─────────────────────────────────────────────────────
        tracing::info!("Loading stances from '{}'", cfg.input);
        let table = DelimitedLoader::csv(&cfg.input).load()?;
        tracing::info!("Loaded {} rows", table.row_count());

        // ── Steps 2–4: Exclude, remap, split ─────────────────────────────────
        let (parts, excluded) = normalize_stances(table, cfg)
            .with_context(|| format!("Cannot normalise '{}'", cfg.input))?;

        // ── Step 5: Write partitions ─────────────────────────────────────────
        write_csv_all(&[
            (&parts.train, Path::new(&cfg.train_out)),
            (&parts.validation, Path::new(&cfg.val_out)),
            (&parts.test, Path::new(&cfg.test_out)),
        ])?;

        let summary = StanceSummary {
            excluded,
            train:      parts.train.row_count(),
            validation: parts.validation.row_count(),
            test:       parts.test.row_count(),
        };
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            summary.train,
            summary.validation,
            summary.test
        );
        Ok(summary)
    }
}
