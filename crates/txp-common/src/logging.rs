//! Logging configuration and initialization
//!
//! One pipeline-wide tracing setup: console output, an append-only log
//! file, or both. [`init_logging`] is called once at process start and
//! returns a [`LogGuard`] that must stay alive until the process ends so
//! the file appender flushes on shutdown.
//!
//! Use the structured macros (`info!`, `warn!`, `error!`) everywhere;
//! never `println!`.
//!
//! # Example
//!
//! ```no_run
//! use txp_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     info!("pipeline starting");
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// Output target for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Console only
    Console,
    /// Log file only
    File,
    /// Console mirrored to the log file
    #[default]
    Both,
}

impl std::str::FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(anyhow::anyhow!("Invalid log output: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level to record
    pub level: LogLevel,

    /// Output target (console, file, or both)
    pub output: LogOutput,

    /// Directory for log files
    pub log_dir: PathBuf,

    /// Log file name prefix ("txp" -> "txp.2025-08-25.log")
    pub log_file_prefix: String,

    /// Extra filter directives, e.g. "sqlx=warn,hyper=warn"
    pub filter_directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Both,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "txp".to_string(),
            filter_directives: None,
        }
    }
}

impl LogConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// - `TXP_LOG_LEVEL`: trace, debug, info, warn, error
    /// - `TXP_LOG_OUTPUT`: console, file, both
    /// - `TXP_LOG_DIR`: directory for log files
    /// - `TXP_LOG_FILE_PREFIX`: log file name prefix
    /// - `TXP_LOG_FILTER`: extra filter directives
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("TXP_LOG_LEVEL") {
            config.level = level.parse()?;
        }
        if let Ok(output) = std::env::var("TXP_LOG_OUTPUT") {
            config.output = output.parse()?;
        }
        if let Ok(dir) = std::env::var("TXP_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Ok(prefix) = std::env::var("TXP_LOG_FILE_PREFIX") {
            config.log_file_prefix = prefix;
        }
        if let Ok(filter) = std::env::var("TXP_LOG_FILTER") {
            config.filter_directives = Some(filter);
        }

        Ok(config)
    }
}

/// Keeps the file appender's background worker alive; dropping it flushes
/// any buffered log lines. Hold it for the life of the process.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the global tracing subscriber. Call exactly once at startup.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(config.level.to_tracing_level().into());

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',') {
            filter = filter.add_directive(
                directive
                    .parse()
                    .context("Failed to parse filter directive")?,
            );
        }
    }

    let file_guard = match config.output {
        LogOutput::Console => {
            let console_layer = fmt::layer().with_writer(std::io::stdout);
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .try_init()?;
            None
        },
        LogOutput::File => {
            let (writer, guard) = file_writer(config)?;
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init()?;
            Some(guard)
        },
        LogOutput::Both => {
            let (writer, guard) = file_writer(config)?;
            let console_layer = fmt::layer().with_writer(std::io::stdout);
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()?;
            Some(guard)
        },
    };

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

fn file_writer(
    config: &LogConfig,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;
    let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
    Ok(tracing_appender::non_blocking(appender))
}
