//! Configuration management
//!
//! All connection parameters and file-system paths for the pipeline, read
//! from environment variables with documented defaults. Every stage takes
//! a `&Config` (or one of its groups) instead of reaching into the
//! environment itself.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default source database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/ecommerce";

/// Default warehouse database URL for local development.
pub const DEFAULT_WAREHOUSE_URL: &str = "postgresql://localhost/warehouse";

/// Default database/warehouse connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default maximum connections in a pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default transactions API endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.example.com/ecommerce_data";

/// Default API request timeout in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default AWS region for the Glue job and S3 bucket.
pub const DEFAULT_AWS_REGION: &str = "us-west-2";

/// Default Glue job name for the real-time workflow.
pub const DEFAULT_GLUE_JOB_NAME: &str = "txp_realtime_etl_job";

/// Default S3 bucket for transformed data uploads.
pub const DEFAULT_S3_BUCKET: &str = "txp-transformed-data";

/// Default interval between job status polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default overall timeout for a monitored job run, in seconds.
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 1800;

/// Default directory scanned for raw CSV drops.
pub const DEFAULT_RAW_DATA_DIR: &str = "./data";

/// Default extractor output file.
pub const DEFAULT_EXTRACTED_DATA_FILE: &str = "extracted_data.csv";

/// Default transformer output file.
pub const DEFAULT_TRANSFORMED_DATA_FILE: &str = "transformed_data.csv";

/// Default directory for Tableau exports.
pub const DEFAULT_TABLEAU_EXPORT_DIR: &str = "./tableau_exports";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub warehouse: WarehouseConfig,
    pub api: ApiConfig,
    pub aws: AwsConfig,
    pub paths: FilePaths,
    pub sources: SourcesConfig,
}

/// Source database (transactional store the extractor reads from)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub connect_timeout_secs: u64,
    pub max_connections: u32,
}

/// Destination warehouse the loader and exporter talk to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub url: String,
    pub connect_timeout_secs: u64,
    pub max_connections: u32,
}

/// Transactions HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// AWS settings for the real-time workflow (Glue + S3)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub glue_job_name: String,
    pub s3_bucket: String,
    /// Endpoint override, for minio or localstack in development
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub poll_interval_secs: u64,
    pub job_timeout_secs: u64,
}

/// File-system handoff points between stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePaths {
    pub raw_data_dir: PathBuf,
    pub extracted_data_file: PathBuf,
    pub transformed_data_file: PathBuf,
    pub tableau_export_dir: PathBuf,
}

/// Extraction-source failure policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// When true, any failing source fails the extraction run. Default is
    /// skip-and-continue: failed sources are logged and the union of the
    /// succeeding sources is kept.
    pub require_all: bool,
}

impl FilePaths {
    /// Look up a path by its well-known key. Returns `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<&Path> {
        match key {
            "raw_data_dir" => Some(&self.raw_data_dir),
            "extracted_data_file" => Some(&self.extracted_data_file),
            "transformed_data_file" => Some(&self.transformed_data_file),
            "tableau_export_dir" => Some(&self.tableau_export_dir),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from `.env` / environment variables and defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            database: DatabaseConfig {
                url: env_or("TXP_DATABASE_URL", DEFAULT_DATABASE_URL),
                connect_timeout_secs: env_parse(
                    "TXP_DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_CONNECT_TIMEOUT_SECS,
                ),
                max_connections: env_parse("TXP_DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            },
            warehouse: WarehouseConfig {
                url: env_or("TXP_WAREHOUSE_URL", DEFAULT_WAREHOUSE_URL),
                connect_timeout_secs: env_parse(
                    "TXP_WAREHOUSE_CONNECT_TIMEOUT",
                    DEFAULT_CONNECT_TIMEOUT_SECS,
                ),
                max_connections: env_parse(
                    "TXP_WAREHOUSE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                ),
            },
            api: ApiConfig {
                endpoint: env_or("TXP_API_ENDPOINT", DEFAULT_API_ENDPOINT),
                api_key: env_or("TXP_API_KEY", ""),
                timeout_secs: env_parse("TXP_API_TIMEOUT", DEFAULT_API_TIMEOUT_SECS),
            },
            aws: AwsConfig {
                region: env_or("TXP_AWS_REGION", DEFAULT_AWS_REGION),
                glue_job_name: env_or("TXP_GLUE_JOB_NAME", DEFAULT_GLUE_JOB_NAME),
                s3_bucket: env_or("TXP_S3_BUCKET", DEFAULT_S3_BUCKET),
                endpoint: std::env::var("TXP_AWS_ENDPOINT").ok(),
                access_key: std::env::var("TXP_AWS_ACCESS_KEY").ok(),
                secret_key: std::env::var("TXP_AWS_SECRET_KEY").ok(),
                poll_interval_secs: env_parse("TXP_POLL_INTERVAL", DEFAULT_POLL_INTERVAL_SECS),
                job_timeout_secs: env_parse("TXP_JOB_TIMEOUT", DEFAULT_JOB_TIMEOUT_SECS),
            },
            paths: FilePaths {
                raw_data_dir: PathBuf::from(env_or("TXP_RAW_DATA_DIR", DEFAULT_RAW_DATA_DIR)),
                extracted_data_file: PathBuf::from(env_or(
                    "TXP_EXTRACTED_DATA_FILE",
                    DEFAULT_EXTRACTED_DATA_FILE,
                )),
                transformed_data_file: PathBuf::from(env_or(
                    "TXP_TRANSFORMED_DATA_FILE",
                    DEFAULT_TRANSFORMED_DATA_FILE,
                )),
                tableau_export_dir: PathBuf::from(env_or(
                    "TXP_TABLEAU_EXPORT_DIR",
                    DEFAULT_TABLEAU_EXPORT_DIR,
                )),
            },
            sources: SourcesConfig {
                require_all: env_parse("TXP_REQUIRE_ALL_SOURCES", false),
            },
        };

        Ok(config)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_paths() -> FilePaths {
        FilePaths {
            raw_data_dir: PathBuf::from("./data"),
            extracted_data_file: PathBuf::from("extracted_data.csv"),
            transformed_data_file: PathBuf::from("transformed_data.csv"),
            tableau_export_dir: PathBuf::from("./tableau_exports"),
        }
    }

    #[test]
    fn test_file_path_lookup() {
        let paths = sample_paths();
        assert_eq!(
            paths.get("raw_data_dir").unwrap(),
            Path::new("./data")
        );
        assert_eq!(
            paths.get("transformed_data_file").unwrap(),
            Path::new("transformed_data.csv")
        );
        assert!(paths.get("no_such_key").is_none());
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        std::env::set_var("TXP_TEST_PARSE_FALLBACK", "not-a-number");
        let parsed: u64 = env_parse("TXP_TEST_PARSE_FALLBACK", 42);
        assert_eq!(parsed, 42);
        std::env::remove_var("TXP_TEST_PARSE_FALLBACK");
    }
}
