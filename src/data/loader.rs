// ============================================================
// Layer 4 — Delimited File Loader / Writer
// ============================================================
// Reads a whole comma- or tab-separated file with a header row
// into a Table, and writes a Table back out as CSV.
//
// Two read modes:
//
//   Strict   — standard CSV quoting; a row with more fields
//              than the header fails the whole read.
//
//   Tolerant — quote characters are ordinary text, rows with
//              more fields than the header are skipped.
//
// In both modes a row with fewer fields than the header is
// padded with missing values.
//
// Both modes fail on bytes that are not UTF-8 and on a file
// with no header row.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::error::PrepError;
use crate::domain::table::Table;
use crate::domain::traits::TableSource;

/// Loads one delimited file as a Table.
/// Implements the TableSource trait from Layer 3.
#[derive(Debug, Clone)]
pub struct DelimitedLoader {
    path:      PathBuf,
    delimiter: u8,
    tolerant:  bool,
}

impl DelimitedLoader {
    /// Strict comma-separated reader
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), delimiter: b',', tolerant: false }
    }

    /// Tolerant tab-separated reader with quoting disabled
    pub fn tolerant_tsv(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), delimiter: b'\t', tolerant: true }
    }
}

impl TableSource for DelimitedLoader {
    fn load(&self) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .quoting(!self.tolerant)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open '{}'", self.path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Cannot read header of '{}'", self.path.display()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(PrepError::EmptyInput(format!(
                "'{}' has no header row",
                self.path.display()
            ))
            .into());
        }

        let mut rows    = Vec::new();
        let mut skipped = 0usize;

        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| {
                format!("Bad record {} in '{}'", idx + 1, self.path.display())
            })?;

            if record.len() > headers.len() {
                if !self.tolerant {
                    return Err(PrepError::RaggedRow {
                        row:      idx + 1,
                        fields:   record.len(),
                        expected: headers.len(),
                    })
                    .with_context(|| format!("Bad record in '{}'", self.path.display()));
                }
                skipped += 1;
                continue;
            }

            rows.push(record.iter().map(|f| Some(f.to_string())).collect::<Vec<_>>());
        }

        if skipped > 0 {
            tracing::debug!(
                "Skipped {} malformed lines in '{}'",
                skipped,
                self.path.display()
            );
        }

        let table = Table::from_rows(headers, rows);
        tracing::debug!(
            "Loaded '{}' ({} rows, {} columns)",
            self.path.display(),
            table.row_count(),
            table.columns().len()
        );
        Ok(table)
    }
}

/// Write a table as comma-separated text with a header row.
/// Missing values are written as empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    write_csv_all(&[(table, path)])
}

/// Write several tables so that either every target is replaced or
/// none is. Each table is first written to a hidden `.partial` file
/// beside its target; the partials are renamed into place only once
/// all of them were written, and removed if any write fails.
pub fn write_csv_all(outputs: &[(&Table, &Path)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(outputs.len());

    for &(table, path) in outputs {
        let partial = partial_path(path)?;
        if let Err(e) = write_table(table, &partial) {
            let _ = fs::remove_file(&partial);
            discard(&staged);
            return Err(e);
        }
        staged.push((partial, path));
    }

    for (i, (partial, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(partial, path) {
            discard(&staged[i..]);
            return Err(e).with_context(|| format!("Cannot replace '{}'", path.display()));
        }
        tracing::debug!("Wrote '{}'", path.display());
    }
    Ok(())
}

fn partial_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| PrepError::InvalidConfig(format!("'{}' is not a file path", path.display())))?;
    let mut partial = std::ffi::OsString::from(".");
    partial.push(name);
    partial.push(".partial");
    Ok(path.with_file_name(partial))
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (partial, _) in staged {
        let _ = fs::remove_file(partial);
    }
}

fn write_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;

    writer.write_record(table.headers())?;
    for i in 0..table.row_count() {
        writer.write_record(table.row(i).iter().map(|v| v.to_field()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Cannot write '{}'", path.display()))?;

    tracing::debug!("Staged {} rows in '{}'", table.row_count(), path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{ColumnKind, Value};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_strict_csv_handles_quotes() {
        let f = file_with(b"Headline,Stance\n\"a, b\",agree\nc,discuss\n");
        let t = DelimitedLoader::csv(f.path()).load().unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column("Headline").unwrap().values[0], Value::Text("a, b".into()));
    }

    #[test]
    fn test_strict_csv_rejects_ragged_rows() {
        let f = file_with(b"a,b\n1,2\n1,2,3\n");
        let err = DelimitedLoader::csv(f.path()).load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::RaggedRow { row: 2, fields: 3, expected: 2 })
        ));
    }

    #[test]
    fn test_strict_csv_pads_short_rows() {
        let f = file_with(b"Headline,Body ID,Stance\nh1,1,agree\nh2,2\nh3,3,discuss\n");
        let t = DelimitedLoader::csv(f.path()).load().unwrap();
        assert_eq!(t.row_count(), 3);
        let stance = &t.column("Stance").unwrap().values;
        assert_eq!(stance[0], Value::Text("agree".into()));
        assert!(stance[1].is_missing());
        assert_eq!(stance[2], Value::Text("discuss".into()));
        assert_eq!(t.column("Body ID").unwrap().kind, ColumnKind::Int);
    }

    #[test]
    fn test_tolerant_tsv_skips_long_rows_and_keeps_quotes() {
        let f = file_with(b"Text\tClass\n\"hi\" there\t1\nbad\t2\textra\nok\t0\n");
        let t = DelimitedLoader::tolerant_tsv(f.path()).load().unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column("Text").unwrap().values[0], Value::Text("\"hi\" there".into()));
        assert_eq!(t.column("Class").unwrap().kind, ColumnKind::Int);
    }

    #[test]
    fn test_tolerant_tsv_pads_short_rows() {
        let f = file_with(b"Text\tClass\nonly text\n");
        let t = DelimitedLoader::tolerant_tsv(f.path()).load().unwrap();
        assert_eq!(t.row_count(), 1);
        assert!(t.column("Class").unwrap().values[0].is_missing());
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let f = file_with(b"Text\tClass\n\xff\xfe\xfd\t1\n");
        assert!(DelimitedLoader::tolerant_tsv(f.path()).load().is_err());
    }

    #[test]
    fn test_empty_file_fails() {
        let f = file_with(b"");
        assert!(DelimitedLoader::csv(f.path()).load().is_err());
    }

    #[test]
    fn test_write_then_read_preserves_cells() {
        let src = file_with(b"id,text,score\n1,\"x, y\",0.5\n2,,1.0\n");
        let table = DelimitedLoader::csv(src.path()).load().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out.csv");
        write_csv(&table, &out).unwrap();

        let back = DelimitedLoader::csv(&out).load().unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_write_csv_all_leaves_nothing_when_one_target_fails() {
        let src = file_with(b"id,text\n1,a\n");
        let table = DelimitedLoader::csv(src.path()).load().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let first  = dir.path().join("first.csv");
        let second = blocker.join("second.csv");

        assert!(write_csv_all(&[(&table, first.as_path()), (&table, second.as_path())]).is_err());
        assert!(!first.exists());

        let mut names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["blocker".to_string()]);
    }

    #[test]
    fn test_write_csv_replaces_existing_file() {
        let src = file_with(b"id\n1\n2\n");
        let table = DelimitedLoader::csv(src.path()).load().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        std::fs::write(&out, "stale\n").unwrap();
        write_csv(&table, &out).unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "id\n1\n2\n");
        assert!(!dir.path().join(".out.csv.partial").exists());
    }
}
