//! TXP Pipeline Library
//!
//! Batch ETL for e-commerce transaction data: extract rows from a
//! database, an HTTP API, and local CSV drops; clean and enrich them;
//! load the result into the warehouse; and export a daily summary for
//! Tableau. Stages run strictly one after another and hand tables to each
//! other through CSV files on local disk.
//!
//! # Example
//!
//! ```no_run
//! use txp_common::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     txp_pipeline::orchestrator::run_pipeline(&config).await?;
//!     Ok(())
//! }
//! ```

pub mod extract;
pub mod load;
pub mod orchestrator;
pub mod pg;
pub mod transform;
pub mod visualization;
