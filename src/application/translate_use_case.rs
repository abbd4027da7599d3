// ============================================================
// Layer 2 — TranslateUseCase
// ============================================================
// Translates every text column of a table in fixed-size
// batches and writes the result:
//
//   Step 1: Load the table                       (Layer 4 - data)
//   Step 2: Load the translation model           (Layer 5 - ml)
//   Step 3: Translate text columns in batches    (Layer 4 - data)
//   Step 4: Write the translated table           (Layer 4 - data)
//
// Numeric columns pass through untouched. Missing text is
// sent as an empty string.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    batcher::{translate_in_batches, DEFAULT_BATCH_SIZE},
    loader::{write_csv, DelimitedLoader},
};
use crate::domain::{
    error::PrepError,
    table::{Table, Value},
    traits::{TableSource, Translator},
};
use crate::infra::checkpoint::ModelStore;
use crate::ml::translator::{BurnTranslator, DEFAULT_MAX_LEN};

// ─── Translate Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    pub input:      String,
    pub output:     String,
    pub model_dir:  String,
    pub batch_size: usize,
    pub max_len:    usize,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            input:      "headlines_only.csv".to_string(),
            output:     "translated_example.csv".to_string(),
            model_dir:  "models/translator".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_len:    DEFAULT_MAX_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateSummary {
    pub rows:    usize,
    pub columns: Vec<String>,
}

/// Replace every text column with its translation, in place.
/// Returns the names of the translated columns.
pub fn translate_table<T: Translator + ?Sized>(
    table:      &mut Table,
    translator: &mut T,
    batch_size: usize,
) -> Result<Vec<String>> {
    if batch_size == 0 {
        return Err(PrepError::InvalidConfig("batch size must be at least 1".into()).into());
    }

    let mut translated = Vec::new();
    for column in table.columns_mut().iter_mut().filter(|c| !c.kind.is_numeric()) {
        let texts: Vec<String> = column
            .values
            .iter()
            .map(|v| v.as_text().unwrap_or_default().to_string())
            .collect();

        tracing::info!("Translating column '{}' ({} values)", column.name, texts.len());
        let output = translate_in_batches(translator, &texts, batch_size)?;

        column.values = output.into_iter().map(Value::Text).collect();
        translated.push(column.name.clone());
    }

    Ok(translated)
}

// ─── TranslateUseCase ─────────────────────────────────────────────────────────
pub struct TranslateUseCase {
    config: TranslateConfig,
}

impl TranslateUseCase {
    pub fn new(config: TranslateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TranslateSummary> {
        let cfg = &self.config;

        // ── Step 1: Load ─────────────────────────────────────────────────────
        let mut table = DelimitedLoader::csv(&cfg.input).load()?;
        tracing::info!("Loaded {} rows from '{}'", table.row_count(), cfg.input);

        // ── Step 2: Model ────────────────────────────────────────────────────
        let mut translator = BurnTranslator::from_store(&ModelStore::new(&cfg.model_dir), cfg.max_len)?;

        // ── Step 3: Translate ────────────────────────────────────────────────
        let columns = translate_table(&mut table, &mut translator, cfg.batch_size)?;

        // ── Step 4: Write ────────────────────────────────────────────────────
        write_csv(&table, Path::new(&cfg.output))?;
        tracing::info!("Wrote translations to '{}'", cfg.output);

        Ok(TranslateSummary { rows: table.row_count(), columns })
    }
}
