//! TXP Realtime - managed job trigger and object-store upload

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, warn};

use txp_common::config::Config;
use txp_common::logging::{init_logging, LogConfig, LogLevel};
use txp_realtime::glue::GlueJobClient;
use txp_realtime::job::{self, JobState, MonitorOptions};
use txp_realtime::storage::Storage;

/// Object key the transformed file is uploaded under.
const TRANSFORMED_OBJECT_KEY: &str = "processed/transformed_data.csv";

#[derive(Parser, Debug)]
#[command(name = "txp-realtime")]
#[command(author, version, about = "TXP managed ETL job runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Trigger the Glue job, wait for it to finish, then upload the
    /// transformed file
    Run,
    /// Upload a file to the configured bucket
    Upload {
        /// Local file to upload
        #[arg(short, long)]
        file: PathBuf,

        /// Object key (defaults to processed/<file name>)
        #[arg(short, long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loads .env first so the log settings can come from it too.
    let config = Config::load()?;

    let mut log_config = LogConfig::from_env()?;
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    let _log_guard = init_logging(&log_config)?;

    let outcome = match &cli.command {
        Command::Run => run_workflow(&config).await,
        Command::Upload { file, key } => {
            let key = key.clone().unwrap_or_else(|| {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());
                format!("processed/{name}")
            });
            let storage = Storage::new(&config.aws).await;
            storage.upload_file(&key, file).await
        },
    };

    if let Err(err) = outcome {
        error!(error = %err, "realtime workflow failed");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_workflow(config: &Config) -> txp_common::Result<()> {
    let client = GlueJobClient::new(&config.aws).await;
    let job_name = &config.aws.glue_job_name;

    let run_id = job::trigger(&client, job_name).await?;
    let state = job::monitor(
        &client,
        job_name,
        &run_id,
        &MonitorOptions::from_config(&config.aws),
    )
    .await?;

    if state != JobState::Succeeded {
        warn!(job = %job_name, run_id = %run_id, state = %state, "job run did not succeed");
    }

    let storage = Storage::new(&config.aws).await;
    storage
        .upload_file(TRANSFORMED_OBJECT_KEY, &config.paths.transformed_data_file)
        .await
}
