//! Warehouse loading stage
//!
//! Ensures the destination table exists and inserts the transformed rows
//! one at a time. There is no batch transaction around the run: rows
//! inserted before a failure stay committed, matching the warehouse
//! client's own semantics.

use std::time::Duration;

use chrono::NaiveDateTime;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use txp_common::config::Config;
use txp_common::table::{parse_timestamp, Field, Table};
use txp_common::Result;

/// Destination DDL, idempotent. Fixed 7-column schema.
pub const CREATE_TABLE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id TEXT,
    customer_id TEXT,
    transaction_date TIMESTAMP,
    transaction_value DOUBLE PRECISION,
    quantity BIGINT,
    revenue_per_transaction DOUBLE PRECISION,
    profit_margin DOUBLE PRECISION
)";

const INSERT_SQL: &str = "\
INSERT INTO transactions (
    transaction_id, customer_id, transaction_date, transaction_value,
    quantity, revenue_per_transaction, profit_margin
) VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// One warehouse row, typed for binding. Every column is nullable; the
/// transformer already decided which cells are null.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub transaction_id: Option<String>,
    pub customer_id: Option<String>,
    pub transaction_date: Option<NaiveDateTime>,
    pub transaction_value: Option<f64>,
    pub quantity: Option<i64>,
    pub revenue_per_transaction: Option<f64>,
    pub profit_margin: Option<f64>,
}

impl TransactionRecord {
    /// Type a row out of the transformed table. Cells that do not fit the
    /// warehouse column type become null.
    pub fn from_table_row(table: &Table, row: usize) -> Self {
        Self {
            transaction_id: cell_text(table.get(row, "transaction_id")),
            customer_id: cell_text(table.get(row, "customer_id")),
            transaction_date: cell_timestamp(table.get(row, "transaction_date")),
            transaction_value: cell_number(table.get(row, "transaction_value")),
            quantity: table.get(row, "quantity").and_then(Field::as_int),
            revenue_per_transaction: cell_number(table.get(row, "revenue_per_transaction")),
            profit_margin: cell_number(table.get(row, "profit_margin")),
        }
    }
}

fn cell_text(cell: Option<&Field>) -> Option<String> {
    match cell {
        None | Some(Field::Null) => None,
        Some(field) => Some(field.render()),
    }
}

fn cell_number(cell: Option<&Field>) -> Option<f64> {
    cell.and_then(Field::as_number)
}

fn cell_timestamp(cell: Option<&Field>) -> Option<NaiveDateTime> {
    match cell {
        Some(Field::Timestamp(ts)) => Some(*ts),
        Some(Field::Text(s)) => parse_timestamp(s),
        _ => None,
    }
}

/// Create the destination table if absent, then insert every row.
/// Returns the number of rows inserted.
pub async fn load(pool: &PgPool, table: &Table) -> Result<u64> {
    sqlx::query(CREATE_TABLE_SQL).execute(pool).await?;

    let mut inserted = 0u64;
    for row in 0..table.len() {
        let record = TransactionRecord::from_table_row(table, row);
        sqlx::query(INSERT_SQL)
            .bind(record.transaction_id)
            .bind(record.customer_id)
            .bind(record.transaction_date)
            .bind(record.transaction_value)
            .bind(record.quantity)
            .bind(record.revenue_per_transaction)
            .bind(record.profit_margin)
            .execute(pool)
            .await?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Columns the transformed file must carry before loading starts.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "transaction_id",
    "customer_id",
    "transaction_date",
    "transaction_value",
    "quantity",
    "revenue_per_transaction",
    "profit_margin",
];

/// Run the loading stage: read the transformed file and load it into the
/// warehouse. The pool is closed on every exit path.
pub async fn run(config: &Config) -> Result<()> {
    let table = Table::read_csv(&config.paths.transformed_data_file)?;
    table.validate_columns(REQUIRED_COLUMNS)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.warehouse.max_connections)
        .acquire_timeout(Duration::from_secs(config.warehouse.connect_timeout_secs))
        .connect(&config.warehouse.url)
        .await?;

    let result = load(&pool, &table).await;
    pool.close().await;

    let inserted = result?;
    info!(rows = inserted, "warehouse load complete");
    Ok(())
}
