// ============================================================
// Layer 3 — Tabular Record Set
// ============================================================
// The single entity every stage works on: named columns of
// equal length, held entirely in memory for one run.
//
// Typing is column-wide, the way a dataframe reads a CSV:
//   - every non-missing cell parses as an integer → Int column
//   - every non-missing cell parses as a number   → Float column
//   - anything else                                → Text column
//
// A column with no values at all is numeric (all missing).
//
// Every operation here keeps relative row order.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PrepError, Result};

/// Spellings read as a missing value.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "<NA>", "#N/A", "None",
];

/// Returns true if a raw field should be read as a missing value
pub fn is_missing_marker(field: &str) -> bool {
    MISSING_MARKERS.contains(&field)
}

/// One cell of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Borrow the string content of a Text cell.
    /// Numbers and missing cells are not strings and return None.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render the cell as it is written to a delimited file.
    /// Missing cells become an empty field.
    pub fn to_field(&self) -> String {
        match self {
            Value::Missing  => String::new(),
            Value::Int(i)   => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Text(s)  => s.clone(),
        }
    }

    /// Convert a numeric cell into its text form, leaving missing cells alone.
    fn into_text(self) -> Value {
        match self {
            Value::Missing => Value::Missing,
            Value::Text(s) => Value::Text(s),
            other          => Value::Text(other.to_field()),
        }
    }

    fn into_float(self) -> Value {
        match self {
            Value::Int(i) => Value::Float(i as f64),
            other         => other,
        }
    }
}

// Integral floats keep a trailing ".0" so a float column stays a float column
// when the file is read back.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// Column-wide storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Int,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnKind::Text)
    }

    // Text absorbs everything, Float absorbs Int.
    fn merge(self, other: ColumnKind) -> ColumnKind {
        match (self, other) {
            (ColumnKind::Text, _) | (_, ColumnKind::Text) => ColumnKind::Text,
            (ColumnKind::Float, _) | (_, ColumnKind::Float) => ColumnKind::Float,
            _ => ColumnKind::Int,
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name:   String,
    pub kind:   ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    /// Build a column from raw fields, inferring its kind.
    /// `None` and missing markers become `Value::Missing`.
    pub fn from_raw(name: impl Into<String>, raw: Vec<Option<String>>) -> Self {
        let present = |f: &Option<String>| -> Option<String> {
            f.as_ref().filter(|s| !is_missing_marker(s)).cloned()
        };

        let fields: Vec<Option<String>> = raw.iter().map(present).collect();

        let all_int = fields.iter().flatten().all(|s| s.trim().parse::<i64>().is_ok());
        let all_num = all_int
            || fields.iter().flatten().all(|s| s.trim().parse::<f64>().is_ok());

        let (kind, values) = if all_int {
            let values = fields
                .into_iter()
                .map(|f| f.and_then(|s| s.trim().parse().ok()).map_or(Value::Missing, Value::Int))
                .collect();
            (ColumnKind::Int, values)
        } else if all_num {
            let values = fields
                .into_iter()
                .map(|f| f.and_then(|s| s.trim().parse().ok()).map_or(Value::Missing, Value::Float))
                .collect();
            (ColumnKind::Float, values)
        } else {
            let values = fields
                .into_iter()
                .map(|f| f.map_or(Value::Missing, Value::Text))
                .collect();
            (ColumnKind::Text, values)
        };

        Self { name: name.into(), kind, values }
    }

    pub fn int(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self {
            name:   name.into(),
            kind:   ColumnKind::Int,
            values: values.into_iter().map(Value::Int).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    fn coerce(mut self, kind: ColumnKind) -> Self {
        if self.kind == kind {
            return self;
        }
        self.values = match kind {
            ColumnKind::Text  => self.values.into_iter().map(Value::into_text).collect(),
            ColumnKind::Float => self.values.into_iter().map(Value::into_float).collect(),
            ColumnKind::Int   => self.values,
        };
        self.kind = kind;
        self
    }
}

/// An in-memory table: columns of equal length, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from a header row and raw data rows.
    /// Short rows are padded with missing values; long rows are truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let mut raw: Vec<Vec<Option<String>>> =
            vec![Vec::with_capacity(rows.len()); headers.len()];

        for row in rows {
            let mut fields = row.into_iter();
            for col in raw.iter_mut() {
                col.push(fields.next().flatten());
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, values)| Column::from_raw(name, values))
            .collect();

        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column the stage cannot run without.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| PrepError::MissingColumn(name.to_string()))
    }

    /// Append a column, or replace an existing one with the same name in place.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(PrepError::LengthMismatch {
                expected: self.row_count(),
                actual:   column.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => *slot = column,
            None       => self.columns.push(column),
        }
        Ok(())
    }

    /// The cells of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Keep the rows whose entry in `keep` is true.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<()> {
        if keep.len() != self.row_count() {
            return Err(PrepError::LengthMismatch {
                expected: self.row_count(),
                actual:   keep.len(),
            });
        }
        for col in &mut self.columns {
            let mut flags = keep.iter();
            col.values.retain(|_| *flags.next().unwrap_or(&false));
        }
        Ok(())
    }

    /// Copy out the rows at `indices`, in the order given.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name:   c.name.clone(),
                kind:   c.kind,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    /// Drop every row with a missing value in any of `names`.
    /// Returns the number of rows dropped.
    pub fn drop_rows_missing(&mut self, names: &[&str]) -> Result<usize> {
        let mut keep = vec![true; self.row_count()];
        for name in names {
            let col = self.require_column(name)?;
            for (flag, value) in keep.iter_mut().zip(&col.values) {
                if value.is_missing() {
                    *flag = false;
                }
            }
        }
        let dropped = keep.iter().filter(|k| !**k).count();
        self.retain_rows(&keep)?;
        Ok(dropped)
    }

    /// Apply `f` to every present cell of every Text column.
    /// Numeric columns are never touched.
    pub fn map_text_columns(&mut self, mut f: impl FnMut(&str) -> String) {
        for col in self.columns.iter_mut().filter(|c| c.kind == ColumnKind::Text) {
            for value in &mut col.values {
                if let Value::Text(s) = value {
                    *s = f(s);
                }
            }
        }
    }

    /// Stack tables vertically.
    ///
    /// Columns are the union of all inputs in first-seen order; a table
    /// lacking a column contributes missing values for it. Mixed kinds
    /// widen (Int → Float → Text).
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut names: Vec<String> = Vec::new();
        let mut kinds: Vec<ColumnKind> = Vec::new();

        for table in &tables {
            for col in &table.columns {
                match names.iter().position(|n| *n == col.name) {
                    Some(i) => kinds[i] = kinds[i].merge(col.kind),
                    None => {
                        names.push(col.name.clone());
                        kinds.push(col.kind);
                    }
                }
            }
        }

        let mut columns: Vec<Column> = names
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| Column { name: name.clone(), kind: *kind, values: Vec::new() })
            .collect();

        for table in tables {
            let rows = table.row_count();
            let mut by_name: Vec<Option<Column>> = names.iter().map(|_| None).collect();
            for col in table.columns {
                if let Some(i) = names.iter().position(|n| *n == col.name) {
                    by_name[i] = Some(col);
                }
            }
            for (target, source) in columns.iter_mut().zip(by_name) {
                match source {
                    Some(col) => target.values.extend(col.coerce(target.kind).values),
                    None      => target.values.extend(std::iter::repeat(Value::Missing).take(rows)),
                }
            }
        }

        Table { columns }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[&str]) -> Vec<Option<String>> {
        fields.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn test_column_kind_inference() {
        assert_eq!(Column::from_raw("a", raw(&["1", "2", ""])).kind, ColumnKind::Int);
        assert_eq!(Column::from_raw("a", raw(&["1", "2.5"])).kind, ColumnKind::Float);
        assert_eq!(Column::from_raw("a", raw(&["1", "x"])).kind, ColumnKind::Text);
        assert_eq!(Column::from_raw("a", raw(&["", "NaN"])).kind, ColumnKind::Int);
    }

    #[test]
    fn test_numbers_in_text_column_stay_text() {
        let col = Column::from_raw("a", raw(&["42", "hello"]));
        assert_eq!(col.values[0], Value::Text("42".into()));
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let t = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![raw(&["x", "y"]), raw(&["z"])],
        );
        assert_eq!(t.row_count(), 2);
        assert!(t.column("b").unwrap().values[1].is_missing());
    }

    #[test]
    fn test_drop_rows_missing_keeps_order() {
        let mut t = Table::from_rows(
            vec!["Text".into(), "Class".into()],
            vec![raw(&["a", "1"]), raw(&["", "2"]), raw(&["c", ""]), raw(&["d", "4"])],
        );
        let dropped = t.drop_rows_missing(&["Text", "Class"]).unwrap();
        assert_eq!(dropped, 2);
        let texts: Vec<_> = t.column("Text").unwrap().values.iter()
            .map(|v| v.to_field()).collect();
        assert_eq!(texts, vec!["a", "d"]);
    }

    #[test]
    fn test_require_column_reports_name() {
        let t = Table::from_rows(vec!["a".into()], vec![raw(&["1"])]);
        let err = t.require_column("Text").unwrap_err();
        assert!(matches!(err, PrepError::MissingColumn(ref n) if n == "Text"));
    }

    #[test]
    fn test_map_text_columns_skips_numeric() {
        let mut t = Table::from_rows(
            vec!["n".into(), "s".into()],
            vec![raw(&["1", "\"q\""])],
        );
        t.map_text_columns(|s| s.replace('"', ""));
        assert_eq!(t.column("n").unwrap().values[0], Value::Int(1));
        assert_eq!(t.column("s").unwrap().values[0], Value::Text("q".into()));
    }

    #[test]
    fn test_concat_unions_columns() {
        let a = Table::from_rows(vec!["x".into(), "y".into()], vec![raw(&["1", "a"])]);
        let b = Table::from_rows(vec!["y".into(), "z".into()], vec![raw(&["b", "2.5"])]);
        let c = Table::concat(vec![a, b]);

        assert_eq!(c.headers(), vec!["x", "y", "z"]);
        assert_eq!(c.row_count(), 2);
        assert!(c.column("x").unwrap().values[1].is_missing());
        assert!(c.column("z").unwrap().values[0].is_missing());
        assert_eq!(c.column("y").unwrap().values[1], Value::Text("b".into()));
    }

    #[test]
    fn test_concat_widens_mixed_kinds() {
        let a = Table::from_rows(vec!["v".into()], vec![raw(&["1"])]);
        let b = Table::from_rows(vec!["v".into()], vec![raw(&["text"])]);
        let c = Table::concat(vec![a, b]);
        assert_eq!(c.column("v").unwrap().kind, ColumnKind::Text);
        assert_eq!(c.column("v").unwrap().values[0], Value::Text("1".into()));
    }

    #[test]
    fn test_float_field_keeps_decimal_point() {
        assert_eq!(Value::Float(2.0).to_field(), "2.0");
        assert_eq!(Value::Float(0.25).to_field(), "0.25");
    }

    #[test]
    fn test_push_column_rejects_wrong_length() {
        let mut t = Table::from_rows(vec!["a".into()], vec![raw(&["1"]), raw(&["2"])]);
        assert!(t.push_column(Column::int("b", vec![1])).is_err());
        assert!(t.push_column(Column::int("b", vec![1, 2])).is_ok());
    }
}
