//! TXP Pipeline - batch ETL driver

use anyhow::Result;
use clap::Parser;
use tracing::error;

use txp_common::config::Config;
use txp_common::logging::{init_logging, LogConfig, LogLevel};
use txp_pipeline::{extract, load, orchestrator, transform, visualization};

#[derive(Parser, Debug)]
#[command(name = "txp-pipeline")]
#[command(author, version, about = "TXP transaction ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the complete pipeline (extract, transform, load, export)
    Run,
    /// Extract from all sources into the extracted-data file
    Extract,
    /// Clean and enrich the extracted data
    Transform,
    /// Load the transformed data into the warehouse
    Load,
    /// Export the daily summary for Tableau
    Export,
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

    // Held until exit so the log file flushes.
    let _log_guard = init_logging(&log_config)?;

    let outcome = match &cli.command {
        Command::Run => orchestrator::run_pipeline(&config).await,
        Command::Extract => extract::run(&config).await.map(|_| ()),
        Command::Transform => transform::run(
            &config.paths.extracted_data_file,
            &config.paths.transformed_data_file,
        ),
        Command::Load => load::run(&config).await,
        Command::Export => visualization::run(&config).await,
    };

    if let Err(err) = outcome {
        // run_pipeline already logged its own failure; stage subcommands
        // have not.
        if !matches!(cli.command, Command::Run) {
            error!(error = %err, "command failed");
        }
        std::process::exit(1);
    }

    Ok(())
}
