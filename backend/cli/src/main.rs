mod config_cmd;
mod deploy_cmd;
mod run_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clove_channels::deploy::RECORDS_FILE_NAME;
use clove_config::{config_dir, config_file_path, load_and_prepare};
use clove_logging::{init_logger, redact_secrets};

use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "clove")]
#[command(about = "Clove: Discord shortcuts bot for the Doughmination system")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.clove/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and answer interactions
    Run,
    /// Replace the global command set and record the command IDs
    Deploy {
        /// Where to keep the deployed command IDs
        #[arg(long)]
        records: Option<PathBuf>,
    },
    /// Print the effective config (secrets masked) and its validation report
    Config,
}

async fn execute(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(|| config_file_path(&config_dir()));
    let prepared = load_and_prepare(&path).await?;
    let config = &prepared.config;
    let _guard = init_logger(config.logging.dir.as_deref(), &config.logging.level);
    prepared.log_findings(&path);

    match cli.command {
        Commands::Run => run_cmd::run(config, &prepared.report).await,
        Commands::Deploy { records } => {
            let records = records.unwrap_or_else(|| config_dir().join(RECORDS_FILE_NAME));
            deploy_cmd::run(config, &prepared.report, &records).await
        }
        Commands::Config => config_cmd::run(config, &path),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = execute(Cli::parse()).await {
        note_error(&redact_secrets(&format!("{e:#}")));
        std::process::exit(1);
    }
}
