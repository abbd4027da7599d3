// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a file on disk and a model call:
//
//   delimited file
//       │
//       ▼
//   DelimitedLoader   → strict CSV or tolerant TSV into a Table
//       │
//       ▼
//   Preprocessor      → quote stripping, sentence cleaning
//       │
//       ▼
//   Splitter          → stratified train / validation / test
//       │
//       ▼
//   Batcher           → fixed-size text batches, padded token tensors
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Reads and writes delimited files
pub mod loader;

/// Cleans text cells and sentences
pub mod preprocessor;

/// Seeded, stratified partitioning
pub mod splitter;

/// Fixed-size batching for translation and model input
pub mod batcher;
