//! TXP Realtime Library
//!
//! Companion workflow to the batch pipeline: trigger the managed Glue
//! transform job, poll its run to a terminal state with a bounded
//! interval-and-timeout loop, and upload the transformed file to S3.
//!
//! # Example
//!
//! ```no_run
//! use txp_common::config::Config;
//! use txp_realtime::glue::GlueJobClient;
//! use txp_realtime::job::{self, MonitorOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let client = GlueJobClient::new(&config.aws).await;
//!     let run_id = job::trigger(&client, &config.aws.glue_job_name).await?;
//!     let state = job::monitor(
//!         &client,
//!         &config.aws.glue_job_name,
//!         &run_id,
//!         &MonitorOptions::from_config(&config.aws),
//!     )
//!     .await?;
//!     println!("job finished: {state}");
//!     Ok(())
//! }
//! ```

pub mod aws;
pub mod glue;
pub mod job;
pub mod storage;
