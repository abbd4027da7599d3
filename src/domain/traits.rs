// ============================================================
// Layer 3 — Core Traits (Capabilities)
// ============================================================
// The pipeline talks to files and pretrained models only
// through these traits, so a stage can run against a real
// burn model or a test double without any change.
//
//   TableSource    → DelimitedLoader (strict CSV, tolerant TSV)
//   TextClassifier → BurnClassifier
//   Translator     → BurnTranslator
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::table::Table;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Anything that can produce a whole table in one bulk read.
pub trait TableSource {
    fn load(&self) -> Result<Table>;
}

// ─── TextClassifier ───────────────────────────────────────────────────────────
/// A pretrained sequence classifier.
///
/// Returns the index of the most probable class for one text.
/// Callers never pass blank text; the pipeline assigns those
/// a sentinel class itself.
pub trait TextClassifier {
    fn classify(&mut self, text: &str) -> Result<i64>;
}

// ─── Translator ───────────────────────────────────────────────────────────────
/// A pretrained sequence-to-sequence translation engine.
///
/// `output[i]` must be the translation of `batch[i]`, and the
/// output must have exactly as many entries as the batch.
pub trait Translator {
    fn translate(&mut self, batch: &[String]) -> Result<Vec<String>>;
}
