//! CLI for the PDM download manager.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_config_path, run_downloads, run_plan};

/// Top-level CLI for the PDM download manager.
#[derive(Debug, Parser)]
#[command(name = "pdm")]
#[command(about = "PDM: parallel HTTP/HTTPS/FTP/SFTP download manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where configuration and the URL list come from.
#[derive(Debug, Clone, Default, Args)]
pub struct Inputs {
    /// Config file (TOML). Defaults to $XDG_CONFIG_HOME/pdm/config.toml, created if missing.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// URL list, one per line. Overrides `download.url.filepath` from the config.
    #[arg(long, value_name = "PATH")]
    pub urls: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every URL in the list, retrying transient failures.
    Run {
        #[command(flatten)]
        inputs: Inputs,
        /// Maximum concurrent transfers (default: `scheduled.threadpool.core.size`).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Write the per-task JSON report here when the run ends.
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Show where each URL would be saved, without downloading.
    Plan {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Print the default config file path.
    ConfigPath,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        match cli.command {
            CliCommand::Run {
                inputs,
                jobs,
                report,
            } => run_downloads(&inputs, jobs, report.as_deref()).await?,
            CliCommand::Plan { inputs } => run_plan(&inputs)?,
            CliCommand::ConfigPath => run_config_path()?,
        }
        Ok(())
    }
}
