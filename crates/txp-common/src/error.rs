//! Error types for the TXP pipeline
//!
//! Every stage returns an explicit `Result` instead of an empty table, so
//! "source had no rows" and "source failed" stay distinguishable at the
//! call site.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Main error type for the TXP pipeline
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Table shape error: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Job run error: {0}")]
    JobRun(String),

    #[error("Job '{job_name}' did not reach a terminal state within {waited_secs}s")]
    JobTimeout { job_name: String, waited_secs: u64 },
}

impl EtlError {
    /// Build a source-unavailable error from any underlying failure.
    pub fn source_unavailable(source_name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        EtlError::SourceUnavailable {
            source_name: source_name.into(),
            reason: err.to_string(),
        }
    }
}
