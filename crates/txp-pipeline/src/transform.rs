//! Data transformation stage
//!
//! Cleans the stacked extraction output (dedup, defaults for missing
//! values, type coercion) and enriches it with two derived columns.
//! Both steps are pure functions over the in-memory table; `run` is the
//! read-transform-write wrapper between the two handoff files.

use std::path::Path;

use tracing::info;

use txp_common::table::{Field, Table};
use txp_common::Result;

/// Assumed margin on every transaction.
pub const PROFIT_MARGIN_RATE: f64 = 0.2;

/// Default customer id for rows that arrived without one.
pub const UNKNOWN_CUSTOMER: &str = "Unknown";

/// Clean the raw table: drop exact duplicates, fill missing customer ids
/// and transaction values with fixed defaults, then coerce the date and
/// value columns. Unparseable cells become null rather than failing the
/// row.
pub fn clean(mut table: Table) -> Table {
    table.dedup_rows();
    table.fill_nulls("customer_id", Field::Text(UNKNOWN_CUSTOMER.to_string()));
    table.fill_nulls("transaction_value", Field::Number(0.0));
    table.map_column("transaction_date", Field::coerce_timestamp);
    table.map_column("transaction_value", Field::coerce_number);
    table
}

/// Append the derived columns:
///
/// - `revenue_per_transaction` = transaction_value / quantity, null when
///   either side is null/unparseable or quantity is not positive
/// - `profit_margin` = transaction_value * [`PROFIT_MARGIN_RATE`]
pub fn enrich(mut table: Table) -> Result<Table> {
    let value_idx = table.column_index("transaction_value");
    let quantity_idx = table.column_index("quantity");

    let mut revenue = Vec::with_capacity(table.len());
    let mut margin = Vec::with_capacity(table.len());
    for row in table.rows() {
        let value = value_idx.and_then(|i| row[i].as_number());
        let quantity = quantity_idx.and_then(|i| row[i].as_number());

        revenue.push(match (value, quantity) {
            (Some(v), Some(q)) if q > 0.0 => Field::Number(v / q),
            _ => Field::Null,
        });
        margin.push(match value {
            Some(v) => Field::Number(v * PROFIT_MARGIN_RATE),
            None => Field::Null,
        });
    }

    table.push_column("revenue_per_transaction", revenue)?;
    table.push_column("profit_margin", margin)?;
    Ok(table)
}

/// Run the transformation stage: read the extracted table, clean and
/// enrich it, and write the complete result. The write is atomic, so a
/// failure anywhere leaves no partial output file.
pub fn run(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let table = Table::read_csv(&input)?;
    let rows_in = table.len();

    let transformed = enrich(clean(table))?;
    transformed.write_csv(&output)?;

    info!(
        rows_in,
        rows_out = transformed.len(),
        output = %output.as_ref().display(),
        "transformation complete"
    );
    Ok(())
}
