//! Postgres row decoding
//!
//! Converts dynamically-typed query results into a [`Table`]. The source
//! and warehouse schemas are not known at compile time, so each cell is
//! tried against the shapes a [`Field`] can hold and falls back to null.

use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row};

use txp_common::table::{Field, Table};
use txp_common::Result;

/// Stack query rows into a table. An empty result set has no column
/// information and yields an empty table.
pub fn table_from_pg_rows(rows: &[PgRow]) -> Result<Table> {
    let Some(first) = rows.first() else {
        return Ok(Table::default());
    };

    let columns: Vec<String> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        let cells = (0..row.columns().len())
            .map(|idx| decode_cell(row, idx))
            .collect();
        table.push_row(cells)?;
    }
    Ok(table)
}

fn decode_cell(row: &PgRow, idx: usize) -> Field {
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Field::Text).unwrap_or(Field::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Field::Int).unwrap_or(Field::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(|i| Field::Int(i64::from(i))).unwrap_or(Field::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Field::Number).unwrap_or(Field::Null);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return v.map(Field::Timestamp).unwrap_or(Field::Null);
    }
    Field::Null
}
