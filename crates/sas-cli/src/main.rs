//! Command-line driver for the shared spectrum registry
//!
//! Loads a registry config, runs operation scripts against it, derives
//! device keys and validates config files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sas_cli::commands::{check_config, common, key, run};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sasctl")]
#[command(about = "Shared spectrum registry - run scripts, derive keys, check configs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap a registry from config and apply an operation script
    Run {
        /// Registry config (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Operation script (JSON array of steps)
        #[arg(short, long)]
        script: PathBuf,

        /// Stop at the first rejected step with a non-zero exit
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the composite key and a grant id for a device
    Key {
        /// FCC identifier
        #[arg(long)]
        fcc_id: String,

        /// Serial number
        #[arg(long)]
        serial: String,

        /// Grant ordinal
        #[arg(long, default_value = "0")]
        ordinal: u64,
    },

    /// Load and validate a config file
    CheckConfig {
        /// Registry config (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Pick the log filter: `RUST_LOG` wins, then `--verbose`, then the config
fn init_logging(verbose: bool, config_level: Option<&str>) {
    let fallback = if verbose {
        "debug"
    } else {
        config_level.unwrap_or("info")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Run {
            config,
            script,
            fail_fast,
        } => {
            // Only the log level is needed here; `run` reports load failures.
            let level = common::load_config(&config).ok().map(|c| c.log_level);
            init_logging(cli.verbose, level.as_deref());
            run::run(&config, &script, fail_fast, &mut out).await?;
        }

        Commands::Key {
            fcc_id,
            serial,
            ordinal,
        } => {
            init_logging(cli.verbose, None);
            key::run(&fcc_id, &serial, ordinal, &mut out)?;
        }

        Commands::CheckConfig { config } => {
            init_logging(cli.verbose, None);
            check_config::run(&config, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
