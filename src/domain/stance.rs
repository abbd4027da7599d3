// ============================================================
// Layer 3 — Stance Labels
// ============================================================
// A stance is the rhetorical relationship between a text and a
// claim: agree / disagree / discuss / unrelated.
//
// The normalizer drops one category and encodes the rest as
// integers in {-1, 0, 1}:
//
//   agree    →  1
//   disagree → -1
//   discuss  →  0
//
// A label with no encoding is an error, never a silent gap.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PrepError, Result};

/// The only codes a remapped stance column may hold.
pub const STANCE_CODES: [i64; 3] = [-1, 0, 1];

/// Category removed before remapping.
pub const DEFAULT_EXCLUDED: &str = "unrelated";

/// Fixed category → code table.
/// Deserialising goes through `LabelMap::new`, so a loaded map is
/// checked the same way as one built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, i64)>", into = "Vec<(String, i64)>")]
pub struct LabelMap {
    entries: Vec<(String, i64)>,
}

impl LabelMap {
    /// Build a map, rejecting codes outside {-1, 0, 1} and duplicate categories.
    pub fn new(entries: Vec<(String, i64)>) -> Result<Self> {
        let map = Self { entries };
        map.validate()?;
        Ok(map)
    }

    pub fn validate(&self) -> Result<()> {
        let entries = &self.entries;
        if entries.is_empty() {
            return Err(PrepError::InvalidConfig("the label map is empty".into()));
        }
        for (i, (name, code)) in entries.iter().enumerate() {
            if !STANCE_CODES.contains(code) {
                return Err(PrepError::InvalidConfig(format!(
                    "stance '{name}' maps to {code}, expected one of {STANCE_CODES:?}"
                )));
            }
            if entries[..i].iter().any(|(other, _)| other == name) {
                return Err(PrepError::InvalidConfig(format!(
                    "stance '{name}' appears twice in the label map"
                )));
            }
        }
        Ok(())
    }

    /// The three-way encoding used for the FNC-1 stance dataset
    pub fn fnc() -> Self {
        Self {
            entries: vec![
                ("agree".to_string(), 1),
                ("disagree".to_string(), -1),
                ("discuss".to_string(), 0),
            ],
        }
    }

    pub fn encode(&self, category: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, code)| *code)
    }
}

impl TryFrom<Vec<(String, i64)>> for LabelMap {
    type Error = PrepError;

    fn try_from(entries: Vec<(String, i64)>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<LabelMap> for Vec<(String, i64)> {
    fn from(map: LabelMap) -> Self {
        map.entries
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::fnc()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnc_encoding() {
        let map = LabelMap::fnc();
        assert_eq!(map.encode("agree"), Some(1));
        assert_eq!(map.encode("disagree"), Some(-1));
        assert_eq!(map.encode("discuss"), Some(0));
        assert_eq!(map.encode("unrelated"), None);
        assert_eq!(map.encode("Agree"), None);
    }

    #[test]
    fn test_rejects_out_of_range_code() {
        let err = LabelMap::new(vec![("agree".into(), 2)]).unwrap_err();
        assert!(matches!(err, PrepError::InvalidConfig(_)));
    }

    #[test]
    fn test_fnc_map_is_valid() {
        assert!(LabelMap::fnc().validate().is_ok());
        let rebuilt = LabelMap::new(vec![
            ("agree".into(), 1),
            ("disagree".into(), -1),
            ("discuss".into(), 0),
        ])
        .unwrap();
        assert_eq!(rebuilt, LabelMap::fnc());
    }

    #[test]
    fn test_rejects_empty_map() {
        assert!(matches!(LabelMap::new(Vec::new()), Err(PrepError::InvalidConfig(_))));
    }

    #[test]
    fn test_deserialize_checks_codes() {
        let ok: LabelMap = serde_json::from_str(r#"[["agree",1],["discuss",0]]"#).unwrap();
        assert_eq!(ok.encode("discuss"), Some(0));

        let bad = serde_json::from_str::<LabelMap>(r#"[["agree",2]]"#).unwrap_err();
        assert!(bad.to_string().contains("expected one of"));
    }

    #[test]
    fn test_serializes_as_pairs() {
        let json = serde_json::to_string(&LabelMap::fnc()).unwrap();
        assert_eq!(json, r#"[["agree",1],["disagree",-1],["discuss",0]]"#);
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let err = LabelMap::new(vec![("agree".into(), 1), ("agree".into(), 0)]).unwrap_err();
        assert!(matches!(err, PrepError::InvalidConfig(_)));
    }
}
