// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Surface-level cleaning applied before scoring or filtering.
//
// Two cleaning rules are used by the scorer:
//
//   1. Wrapping quotes (cell level, whole table)
//      A text cell that both starts and ends with '"' loses
//      exactly one character at each end:
//        "\"hello\""  →  "hello"
//        "\"a\" b"    →  unchanged (does not end with a quote)
//
//   2. Sentence cleaning (first column, before scoring)
//      trim whitespace, then strip every leading/trailing '"',
//      then every leading/trailing '\''.
//
// Only Text columns are cleaned; numbers are left as they are.
//
// Reference: Rust Book §8 (Strings in Rust)

use crate::domain::table::Table;

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Remove one pair of wrapping double quotes from a cell.
    pub fn strip_wrapping_quotes(&self, cell: &str) -> String {
        if cell.starts_with('"') && cell.ends_with('"') {
            // A lone quote is both the opening and the closing character.
            if cell.len() == 1 {
                return String::new();
            }
            cell[1..cell.len() - 1].to_string()
        } else {
            cell.to_string()
        }
    }

    /// Strip wrapping quotes from every text cell of a table, in place.
    pub fn strip_table_quotes(&self, table: &mut Table) {
        table.map_text_columns(|cell| self.strip_wrapping_quotes(cell));
    }

    /// Normalise one sentence before it is scored.
    pub fn clean_sentence(&self, sentence: &str) -> String {
        sentence
            .trim()
            .trim_matches('"')
            .trim_matches('\'')
            .to_string()
    }

    /// True for text with no visible characters.
    pub fn is_blank(&self, text: &str) -> bool {
        text.trim().is_empty()
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Value;

    #[test]
    fn test_strips_one_pair_of_quotes() {
        let p = Preprocessor::new();
        assert_eq!(p.strip_wrapping_quotes("\"hello\""), "hello");
        assert_eq!(p.strip_wrapping_quotes("\"\"twice\"\""), "\"twice\"");
    }

    #[test]
    fn test_leaves_unbalanced_quotes() {
        let p = Preprocessor::new();
        assert_eq!(p.strip_wrapping_quotes("\"open"), "\"open");
        assert_eq!(p.strip_wrapping_quotes("close\""), "close\"");
        assert_eq!(p.strip_wrapping_quotes("plain"), "plain");
    }

    #[test]
    fn test_lone_quote_becomes_empty() {
        let p = Preprocessor::new();
        assert_eq!(p.strip_wrapping_quotes("\""), "");
    }

    #[test]
    fn test_clean_sentence() {
        let p = Preprocessor::new();
        assert_eq!(p.clean_sentence("  \"'quoted'\"  "), "quoted");
        assert_eq!(p.clean_sentence("it's fine"), "it's fine");
    }

    #[test]
    fn test_table_quotes_only_touch_text() {
        let p = Preprocessor::new();
        let mut t = Table::from_rows(
            vec!["n".into(), "s".into()],
            vec![vec![Some("7".into()), Some("\"x\"".into())]],
        );
        p.strip_table_quotes(&mut t);
        assert_eq!(t.column("n").unwrap().values[0], Value::Int(7));
        assert_eq!(t.column("s").unwrap().values[0], Value::Text("x".into()));
    }

    #[test]
    fn test_is_blank() {
        let p = Preprocessor::new();
        assert!(p.is_blank("   \t"));
        assert!(p.is_blank(""));
        assert!(!p.is_blank(" a "));
    }
}
