// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by every stage:
//
//   table   — the Tabular Record Set (columns, typed cells)
//   stance  — stance categories and their numeric encoding
//   traits  — capabilities the stages depend on
//   error   — the failure taxonomy
//
// No burn types, no file I/O.

pub mod error;

pub mod table;

pub mod stance;

pub mod traits;
