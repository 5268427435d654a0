//! Visualization export stage
//!
//! Runs the fixed daily-summary aggregation against the warehouse and
//! writes the result as a CSV that Tableau picks up. Nothing is written
//! when the summary comes back empty.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use txp_common::config::{Config, WarehouseConfig};
use txp_common::table::Table;
use txp_common::Result;

use crate::pg::table_from_pg_rows;

/// Key metrics per transaction date.
pub const DAILY_SUMMARY_QUERY: &str = "\
SELECT
    transaction_date,
    SUM(transaction_value) AS total_revenue,
    AVG(profit_margin) AS avg_profit_margin
FROM transactions
GROUP BY transaction_date
ORDER BY transaction_date";

/// File name of the Tableau export inside the export directory.
pub const EXPORT_FILE_NAME: &str = "tableau_export.csv";

/// Open a warehouse connection for the exporter. Returns `None` when the
/// connection cannot be built; callers must check before fetching.
pub async fn build_connection(config: &WarehouseConfig) -> Option<PgPool> {
    let connected = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await;

    match connected {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(error = %err, "could not build warehouse connection for export");
            None
        },
    }
}

/// Execute a read query through the handle and stack the result rows.
pub async fn fetch(pool: &PgPool, query: &str) -> Result<Table> {
    let rows = sqlx::query(query).fetch_all(pool).await?;
    table_from_pg_rows(&rows)
}

/// Write a table into the export directory, creating it if needed.
/// Returns the path written.
pub fn export(table: &Table, dir: impl AsRef<Path>, file_name: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    table.write_csv(&path)?;
    Ok(path)
}

/// Run the export stage: fetch the summary and export it when non-empty.
pub async fn run(config: &Config) -> Result<()> {
    let Some(pool) = build_connection(&config.warehouse).await else {
        warn!("skipping visualization export, no warehouse connection");
        return Ok(());
    };

    let fetched = fetch(&pool, DAILY_SUMMARY_QUERY).await;
    pool.close().await;
    let table = fetched?;

    if table.is_empty() {
        info!("daily summary is empty, nothing to export");
        return Ok(());
    }

    let path = export(&table, &config.paths.tableau_export_dir, EXPORT_FILE_NAME)?;
    info!(rows = table.len(), path = %path.display(), "tableau export written");
    Ok(())
}
