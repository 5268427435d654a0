//! Source-database extraction
//!
//! One fixed read query over the transactional store. The pool lives only
//! for the duration of the call; it is closed before returning on every
//! path.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use txp_common::config::DatabaseConfig;
use txp_common::table::Table;
use txp_common::Result;

use crate::pg::table_from_pg_rows;

/// The one query the extractor runs against the source database.
pub const EXTRACT_QUERY: &str = "SELECT * FROM transactions";

/// Fetch all transaction rows from the source database.
pub async fn fetch(config: &DatabaseConfig) -> Result<Table> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await?;

    let result = fetch_all(&pool).await;
    pool.close().await;
    result
}

async fn fetch_all(pool: &PgPool) -> Result<Table> {
    let rows = sqlx::query(EXTRACT_QUERY).fetch_all(pool).await?;
    debug!(rows = rows.len(), "source database query returned");
    table_from_pg_rows(&rows)
}
