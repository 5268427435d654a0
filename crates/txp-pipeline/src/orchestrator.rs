//! Pipeline orchestration
//!
//! Runs the four stages in fixed order: extract, transform, load, export.
//! A stage failure stops the sequence; later stages never run on stale
//! intermediate files. The whole run is wrapped in a wall-clock timer and
//! the outcome is logged exactly once here.

use std::future::Future;
use std::time::Instant;

use tracing::{error, info};

use txp_common::config::Config;
use txp_common::Result;

use crate::{extract, load, transform, visualization};

/// Run one stage with start/completion logging. Errors propagate to the
/// pipeline level, which owns the single error log line.
pub async fn run_stage<F, Fut>(name: &str, stage: F) -> Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    info!(stage = name, "stage starting");
    stage().await?;
    info!(stage = name, "stage complete");
    Ok(())
}

/// Execute the complete pipeline. Logs the elapsed wall-clock time and
/// the outcome, then returns it to the caller for exit-code handling.
pub async fn run_pipeline(config: &Config) -> Result<()> {
    info!("starting the ETL pipeline");
    let started = Instant::now();

    let result = run_stages(config).await;

    let elapsed_secs = started.elapsed().as_secs_f64();
    match &result {
        Ok(()) => info!(elapsed_secs, "ETL pipeline completed successfully"),
        Err(err) => error!(elapsed_secs, error = %err, "ETL pipeline failed"),
    }
    result
}

async fn run_stages(config: &Config) -> Result<()> {
    run_stage("extract", || async {
        extract::run(config).await.map(|_| ())
    })
    .await?;

    run_stage("transform", || async {
        transform::run(
            &config.paths.extracted_data_file,
            &config.paths.transformed_data_file,
        )
    })
    .await?;

    run_stage("load", || load::run(config)).await?;
    run_stage("export", || visualization::run(config)).await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use txp_common::EtlError;

    #[tokio::test]
    async fn test_failed_stage_short_circuits_the_rest() {
        let calls: Mutex<Vec<&str>> = Mutex::new(Vec::new());

        let result = async {
            run_stage("extract", || async {
                calls.lock().unwrap().push("extract");
                Ok(())
            })
            .await?;
            run_stage("load", || async {
                calls.lock().unwrap().push("load");
                Err(EtlError::Config("warehouse down".into()))
            })
            .await?;
            run_stage("export", || async {
                calls.lock().unwrap().push("export");
                Ok(())
            })
            .await?;
            Ok(())
        }
        .await;

        assert!(matches!(result, Err(EtlError::Config(_))));
        // The exporter never ran after the loader failed.
        assert_eq!(*calls.lock().unwrap(), vec!["extract", "load"]);
    }

    #[tokio::test]
    async fn test_stages_run_in_order_on_success() {
        let calls: Mutex<Vec<&str>> = Mutex::new(Vec::new());

        let result = async {
            for name in ["extract", "transform", "load", "export"] {
                run_stage(name, || async {
                    calls.lock().unwrap().push(name);
                    Ok(())
                })
                .await?;
            }
            Ok::<(), EtlError>(())
        }
        .await;

        assert!(result.is_ok());
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["extract", "transform", "load", "export"]
        );
    }
}
