//! Data extraction stage
//!
//! Pulls transaction rows from three independent sources (source database,
//! HTTP API, raw CSV drop directory), stacks them into one table, and
//! persists the result to the extracted-data handoff file.
//!
//! Each source reports an explicit `Result`, so an empty source and a
//! failed source are different things. The default policy is
//! skip-and-continue: a failed source is logged and the union of the
//! succeeding sources is kept. Setting `sources.require_all` turns any
//! source failure into a stage failure.

pub mod api;
pub mod database;
pub mod files;

use tracing::{info, warn};

use txp_common::config::Config;
use txp_common::table::Table;
use txp_common::{EtlError, Result};

/// Merge per-source results into one stacked table.
///
/// With `require_all` set, the first source failure is returned as-is.
/// Otherwise failures are logged and skipped; if every source failed the
/// first failure is returned, since there is nothing left to continue with.
pub fn merge_sources(
    outcomes: Vec<(&'static str, Result<Table>)>,
    require_all: bool,
) -> Result<Table> {
    let mut tables = Vec::new();
    let mut first_failure: Option<EtlError> = None;

    for (name, outcome) in outcomes {
        match outcome {
            Ok(table) => {
                info!(source = name, rows = table.len(), "source extracted");
                tables.push(table);
            },
            Err(err) => {
                if require_all {
                    return Err(err);
                }
                warn!(source = name, error = %err, "source failed, continuing without it");
                first_failure.get_or_insert(err);
            },
        }
    }

    if tables.is_empty() {
        if let Some(err) = first_failure {
            return Err(err);
        }
    }

    Ok(Table::concat_outer(tables))
}

/// Run the extraction stage: query all three sources, stack the results,
/// and write the combined table to the configured extracted-data file.
pub async fn run(config: &Config) -> Result<Table> {
    let db_result = database::fetch(&config.database).await;

    let api_result = match api::build_client(&config.api) {
        Ok(client) => api::fetch(&client, &config.api).await,
        Err(err) => Err(err),
    };

    let files_result = files::read_dir(&config.paths.raw_data_dir);

    let combined = merge_sources(
        vec![
            ("database", db_result),
            ("api", api_result),
            ("files", files_result),
        ],
        config.sources.require_all,
    )?;

    combined.write_csv(&config.paths.extracted_data_file)?;
    info!(
        rows = combined.len(),
        output = %config.paths.extracted_data_file.display(),
        "extraction complete"
    );

    Ok(combined)
}
