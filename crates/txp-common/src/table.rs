//! In-memory tabular data model
//!
//! A [`Table`] is an ordered set of named columns plus rows of [`Field`]
//! values, held fully in memory while a stage works on it. Stages hand
//! tables to each other through CSV files on local disk, so the CSV
//! round-trip here is the wire format of the whole pipeline: UTF-8, header
//! row, empty cell ⇔ null.

use std::collections::HashSet;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{EtlError, Result};

/// Canonical timestamp format used in CSV output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Text(String),
    Number(f64),
    Int(i64),
    Timestamp(NaiveDateTime),
}

impl Field {
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Canonical CSV rendering. `Null` renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Field::Null => String::new(),
            Field::Text(s) => s.clone(),
            Field::Number(n) => n.to_string(),
            Field::Int(i) => i.to_string(),
            Field::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Cell as read back from CSV: empty ⇒ `Null`, anything else ⇒ `Text`.
    pub fn from_csv_cell(cell: &str) -> Field {
        if cell.is_empty() {
            Field::Null
        } else {
            Field::Text(cell.to_string())
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Field::Number(n) => Some(*n),
            Field::Int(i) => Some(*i as f64),
            Field::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Integer view of the value, if it is whole.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Field::Int(i) => Some(*i),
            Field::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            Field::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|n| n.fract() == 0.0).map(|n| n as i64))
            },
            _ => None,
        }
    }

    /// Coerce to a number, turning unparseable values into `Null`.
    pub fn coerce_number(self) -> Field {
        match self.as_number() {
            Some(n) => Field::Number(n),
            None => Field::Null,
        }
    }

    /// Coerce to a timestamp, turning unparseable values into `Null`.
    pub fn coerce_timestamp(self) -> Field {
        match self {
            Field::Timestamp(ts) => Field::Timestamp(ts),
            Field::Text(s) => match parse_timestamp(&s) {
                Some(ts) => Field::Timestamp(ts),
                None => Field::Null,
            },
            _ => Field::Null,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Parse a timestamp from the formats the sources actually emit:
/// RFC 3339, `%Y-%m-%d %H:%M:%S`, or a bare date.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

/// An ordered sequence of rows sharing a named-column schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Field>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column name), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Field> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn push_row(&mut self, row: Vec<Field>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(EtlError::Shape(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Stack tables on top of each other with a schema union: columns keep
    /// first-seen order, cells a table lacks become `Null`. Rows are never
    /// joined or deduplicated here.
    pub fn concat_outer(tables: Vec<Table>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for col in &table.columns {
                if !columns.contains(col) {
                    columns.push(col.clone());
                }
            }
        }

        let mut out = Table::new(columns);
        for table in tables {
            let mapping: Vec<Option<usize>> = out
                .columns
                .iter()
                .map(|c| table.column_index(c))
                .collect();
            for row in table.rows {
                let cells = mapping
                    .iter()
                    .map(|idx| match idx {
                        Some(i) => row[*i].clone(),
                        None => Field::Null,
                    })
                    .collect();
                out.rows.push(cells);
            }
        }
        out
    }

    /// Replace null cells in a column with a fixed value. A table without
    /// the column is left untouched.
    pub fn fill_nulls(&mut self, column: &str, value: Field) {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        for row in &mut self.rows {
            if row[idx].is_null() {
                row[idx] = value.clone();
            }
        }
    }

    /// Apply a coercion to every cell in a column. A table without the
    /// column is left untouched.
    pub fn map_column(&mut self, column: &str, f: impl Fn(Field) -> Field) {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        for row in &mut self.rows {
            let cell = std::mem::replace(&mut row[idx], Field::Null);
            row[idx] = f(cell);
        }
    }

    /// Append a new column with one value per existing row.
    pub fn push_column(&mut self, name: &str, values: Vec<Field>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(EtlError::Shape(format!(
                "column '{}' has {} values, table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Remove exact-duplicate rows, keeping the first occurrence.
    pub fn dedup_rows(&mut self) {
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        self.rows
            .retain(|row| seen.insert(row.iter().map(Field::render).collect()));
    }

    /// Check that every required column is present.
    pub fn validate_columns(&self, required: &[&str]) -> Result<()> {
        for col in required {
            if self.column_index(col).is_none() {
                return Err(EtlError::MissingColumn((*col).to_string()));
            }
        }
        Ok(())
    }

    /// Read a header-first CSV table. Empty cells become `Null`.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Table> {
        let file = std::fs::File::open(path)?;
        Self::read_from(file)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Table> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let columns = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut table = Table::new(columns);
        for record in csv_reader.records() {
            let record = record?;
            let row = record.iter().map(Field::from_csv_cell).collect();
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Write the table as CSV. The file is written to a temporary sibling
    /// and renamed into place, so a failed write never leaves a partial
    /// output behind.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("csv.tmp");

        let file = std::fs::File::create(&tmp_path)?;
        match self.write_to(file) {
            Ok(()) => {
                std::fs::rename(&tmp_path, path)?;
                Ok(())
            },
            Err(err) => {
                let _ = std::fs::remove_file(&tmp_path);
                Err(err)
            },
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(Field::render))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn text(s: &str) -> Field {
        Field::Text(s.to_string())
    }

    #[test]
    fn test_concat_outer_unions_schemas() {
        let mut a = Table::new(vec!["transaction_id".into(), "quantity".into()]);
        a.push_row(vec![text("T1"), Field::Int(2)]).unwrap();

        let mut b = Table::new(vec!["transaction_id".into(), "customer_id".into()]);
        b.push_row(vec![text("T2"), text("C9")]).unwrap();

        let combined = Table::concat_outer(vec![a, b]);
        assert_eq!(
            combined.columns(),
            &["transaction_id", "quantity", "customer_id"]
        );
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.get(0, "customer_id"), Some(&Field::Null));
        assert_eq!(combined.get(1, "quantity"), Some(&Field::Null));
        assert_eq!(combined.get(1, "customer_id"), Some(&text("C9")));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![text("1"), text("x")]).unwrap();
        table.push_row(vec![text("2"), text("y")]).unwrap();
        table.push_row(vec![text("1"), text("x")]).unwrap();

        table.dedup_rows();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "a"), Some(&text("1")));
        assert_eq!(table.get(1, "a"), Some(&text("2")));

        // Idempotent: deduplicating again changes nothing.
        let before = table.clone();
        table.dedup_rows();
        assert_eq!(table, before);
    }

    #[test]
    fn test_csv_round_trip() {
        let mut table = Table::new(vec![
            "transaction_id".into(),
            "transaction_value".into(),
            "transaction_date".into(),
        ]);
        table
            .push_row(vec![
                text("T1"),
                Field::Number(12.5),
                Field::Timestamp(parse_timestamp("2024-03-01 10:30:00").unwrap()),
            ])
            .unwrap();
        table
            .push_row(vec![text("T2"), Field::Null, Field::Null])
            .unwrap();

        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        let read_back = Table::read_from(buf.as_slice()).unwrap();

        assert_eq!(read_back.columns(), table.columns());
        assert_eq!(read_back.len(), table.len());
        for (row_idx, row) in table.rows().iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                assert_eq!(
                    read_back.rows()[row_idx][col_idx].render(),
                    cell.render(),
                    "cell ({row_idx}, {col_idx})"
                );
            }
        }
        assert_eq!(read_back.get(1, "transaction_value"), Some(&Field::Null));
    }

    #[test]
    fn test_write_csv_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(vec!["a".into()]);
        table.push_row(vec![text("1")]).unwrap();
        table.write_csv(&path).unwrap();

        let read_back = Table::read_csv(&path).unwrap();
        assert_eq!(read_back.len(), 1);
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(text("12.5").coerce_number(), Field::Number(12.5));
        assert_eq!(text("bad").coerce_number(), Field::Null);
        assert_eq!(Field::Null.coerce_number(), Field::Null);
        assert_eq!(Field::Int(3).coerce_number(), Field::Number(3.0));
    }

    #[test]
    fn test_coerce_timestamp_formats() {
        for s in ["2024-03-01T10:30:00Z", "2024-03-01 10:30:00"] {
            let coerced = text(s).coerce_timestamp();
            assert_eq!(
                coerced,
                Field::Timestamp(parse_timestamp("2024-03-01 10:30:00").unwrap()),
                "input {s:?}"
            );
        }
        assert_eq!(
            text("2024-03-01").coerce_timestamp().render(),
            "2024-03-01 00:00:00"
        );
        assert_eq!(text("yesterday").coerce_timestamp(), Field::Null);
    }

    #[test]
    fn test_as_int() {
        assert_eq!(text("4").as_int(), Some(4));
        assert_eq!(text("4.0").as_int(), Some(4));
        assert_eq!(text("4.5").as_int(), None);
        assert_eq!(Field::Number(2.0).as_int(), Some(2));
        assert_eq!(Field::Null.as_int(), None);
    }

    #[test]
    fn test_validate_columns() {
        let table = Table::new(vec!["transaction_id".into(), "quantity".into()]);
        assert!(table.validate_columns(&["transaction_id"]).is_ok());
        let err = table.validate_columns(&["customer_id"]).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn(c) if c == "customer_id"));
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        let err = table.push_row(vec![text("only-one")]).unwrap_err();
        assert!(matches!(err, EtlError::Shape(_)));
    }
}
