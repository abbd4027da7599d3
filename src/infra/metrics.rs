// ============================================================
// Layer 6 — Score Report Writer
// ============================================================
// Records translation-quality scores to a CSV file, one row
// per candidate corpus.
//
// Example CSV output:
//   candidate,bleu,chrf,meteor
//   Helsinki,27.431200,55.019800,0.481300
//   Google,31.902400,58.117000,0.522900
//
// BLEU and chrF are on a 0–100 scale, METEOR on 0–1.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::eval::CorpusScores;

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub candidate: String,
    pub bleu:      f64,
    pub chrf:      f64,
    pub meteor:    f64,
}

impl ScoreRow {
    pub fn new(candidate: impl Into<String>, scores: CorpusScores) -> Self {
        Self {
            candidate: candidate.into(),
            bleu:      scores.bleu,
            chrf:      scores.chrf,
            meteor:    scores.meteor,
        }
    }
}

/// Collects score rows and writes them out in one go.
pub struct ScoreReport {
    csv_path: PathBuf,
    rows:     Vec<ScoreRow>,
}

impl ScoreReport {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self { csv_path: csv_path.into(), rows: Vec::new() }
    }

    pub fn push(&mut self, row: ScoreRow) {
        self.rows.push(row);
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    /// Overwrite the report file with every collected row.
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.csv_path)
            .with_context(|| format!("Cannot create report '{}'", self.csv_path.display()))?;

        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::debug!(
            "Wrote {} score rows to '{}'",
            self.rows.len(),
            self.csv_path.display()
        );
        Ok(())
    }

    #[cfg(test)]
    pub fn csv_path(&self) -> &std::path::Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn scores(bleu: f64) -> CorpusScores {
        CorpusScores { bleu, chrf: 50.0, meteor: 0.5 }
    }

    #[test]
    fn test_report_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = ScoreReport::new(dir.path().join("nested/scores.csv"));
        report.push(ScoreRow::new("Helsinki", scores(27.5)));
        report.push(ScoreRow::new("Google", scores(31.0)));
        report.write().unwrap();

        let text = fs::read_to_string(report.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "candidate,bleu,chrf,meteor");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Helsinki,27.5,"));
    }

    #[test]
    fn test_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = ScoreReport::new(dir.path().join("scores.csv"));
        report.push(ScoreRow::new("A", scores(10.0)));
        report.write().unwrap();

        let mut reader = csv::Reader::from_path(report.csv_path()).unwrap();
        let back: Vec<ScoreRow> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(back, report.rows());
    }
}
