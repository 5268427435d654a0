//! TXP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and utilities for the TXP transaction pipeline.
//!
//! # Overview
//!
//! This crate provides the pieces used by every pipeline stage:
//!
//! - **Error Handling**: the [`EtlError`] type and [`Result`] alias
//! - **Configuration**: environment-driven [`config::Config`]
//! - **Logging**: console/file tracing setup with an explicit flush guard
//! - **Table**: the in-memory tabular data model with CSV I/O
//!
//! # Example
//!
//! ```no_run
//! use txp_common::table::Table;
//! use txp_common::Result;
//!
//! fn row_count(path: &str) -> Result<usize> {
//!     let table = Table::read_csv(path)?;
//!     Ok(table.len())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod table;

// Re-export commonly used types
pub use error::{EtlError, Result};
