// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per pipeline stage. Each one loads its input,
// drives the lower layers, writes its output and returns a
// summary for Layer 1 to print.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Every stage is a pure table transformation wrapped by an
// `execute` that does the file IO, so the transformation can
// be tested with in-memory tables and test doubles.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Exclude, encode and split a stance dataset
pub mod stance_use_case;

// Score candidate translations against a reference
pub mod score_use_case;

// Merge a directory of tweet files
pub mod aggregate_use_case;

// Classify and keep safe rows
pub mod filter_use_case;

// Translate text columns in batches
pub mod translate_use_case;
