// ============================================================
// Layer 2 — ScoreUseCase
// ============================================================
// Compares two or more candidate translations of the same
// corpus against one reference:
//
//   Step 1: Write quote-stripped copies          (Layer 4 - data)
//   Step 2: Load first-column sentences          (Layer 4 - data)
//   Step 3: Truncate to the shortest corpus      (Layer 5b - eval)
//   Step 4: BLEU / chrF / METEOR per candidate   (Layer 5b - eval)
//   Step 5: Optional score report               (Layer 6 - infra)
//
// Reference: Rust Book §8 (Common Collections)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    loader::{write_csv, DelimitedLoader},
    preprocessor::Preprocessor,
};
use crate::domain::{error::PrepError, traits::TableSource};
use crate::eval::{score_corpus, tokenize::Tokenizer13a, truncate_to_common};
use crate::infra::metrics::{ScoreReport, ScoreRow};

/// A named candidate translation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub path: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

/// Source file and destination for one quote-stripped copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanJob {
    pub source: String,
    pub target: String,
}

impl CleanJob {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

// ─── Score Configuration ──────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub reference:  String,
    pub candidates: Vec<Candidate>,
    pub clean:      Vec<CleanJob>,
    pub report:     Option<String>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            reference:  "example.csv".to_string(),
            candidates: vec![
                Candidate::new("Helsinki", "translated_tryout.csv"),
                Candidate::new("Google", "headlines_only2.csv"),
            ],
            clean: vec![
                CleanJob::new("translated_tryout.csv", "translated_tryout_cleaned.csv"),
                CleanJob::new("headlines_only2.csv", "headlines_only_cleaned.csv"),
            ],
            report: None,
        }
    }
}

/// Load the first column of a CSV as cleaned sentences.
/// Missing cells are dropped, not kept as empty sentences.
pub fn load_sentences(path: &str, preprocessor: &Preprocessor) -> Result<Vec<String>> {
    let table = DelimitedLoader::csv(path).load()?;
    let first = table
        .columns()
        .first()
        .ok_or_else(|| PrepError::EmptyInput(format!("'{path}' has no columns")))?;

    Ok(first
        .values
        .iter()
        .filter(|v| !v.is_missing())
        .map(|v| preprocessor.clean_sentence(&v.to_field()))
        .collect())
}

// ─── ScoreUseCase ─────────────────────────────────────────────────────────────
pub struct ScoreUseCase {
    config:       ScoreConfig,
    preprocessor: Preprocessor,
}

impl ScoreUseCase {
    pub fn new(config: ScoreConfig) -> Self {
        Self { config, preprocessor: Preprocessor::new() }
    }

    /// Returns one score row per candidate, in configuration order.
    pub fn execute(&self) -> Result<Vec<ScoreRow>> {
        let cfg = &self.config;

        if cfg.candidates.len() < 2 {
            return Err(PrepError::InvalidConfig(format!(
                "at least two candidates are needed, got {}",
                cfg.candidates.len()
            ))
            .into());
        }

        // ── Step 1: Quote-stripped copies ────────────────────────────────────
        for job in &cfg.clean {
            let mut table = DelimitedLoader::csv(&job.source).load()?;
            self.preprocessor.strip_table_quotes(&mut table);
            write_csv(&table, Path::new(&job.target))?;
            tracing::info!("Cleaned '{}' → '{}'", job.source, job.target);
        }

        // ── Step 2: Load sentences ───────────────────────────────────────────
        let mut corpora = Vec::with_capacity(cfg.candidates.len() + 1);
        corpora.push(
            load_sentences(&cfg.reference, &self.preprocessor)
                .with_context(|| format!("Cannot load reference '{}'", cfg.reference))?,
        );
        for cand in &cfg.candidates {
            corpora.push(
                load_sentences(&cand.path, &self.preprocessor)
                    .with_context(|| format!("Cannot load candidate '{}'", cand.path))?,
            );
        }

        // ── Step 3: Align lengths ────────────────────────────────────────────
        let aligned = truncate_to_common(&mut corpora);
        if aligned == 0 {
            return Err(PrepError::EmptyInput("no aligned sentences to score".into()).into());
        }
        tracing::info!("Scoring {} aligned sentences", aligned);

        // ── Step 4: Score each candidate ─────────────────────────────────────
        let tokenizer = Tokenizer13a::new()?;
        let (reference, hypotheses) = corpora.split_at(1);

        let mut rows = Vec::with_capacity(cfg.candidates.len());
        for (cand, hyps) in cfg.candidates.iter().zip(hypotheses) {
            let scores = score_corpus(hyps, &reference[0], &tokenizer)?;
            tracing::debug!("{}: {:?}", cand.name, scores);
            rows.push(ScoreRow::new(cand.name.clone(), scores));
        }

        // ── Step 5: Report ───────────────────────────────────────────────────
        if let Some(path) = &cfg.report {
            let mut report = ScoreReport::new(path);
            for row in &rows {
                report.push(row.clone());
            }
            report.write()?;
            tracing::info!("Wrote score report '{}'", path);
        }

        Ok(rows)
    }
}
