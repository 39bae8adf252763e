//! memlens CLI
//!
//! Analyses process memory telemetry: growth trends from structured log
//! files and per-module rankings from a live introspection endpoint.

mod client;
mod commands;
mod config;
mod export;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{live, logs};
use memlens_lib::AnalysisError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when the source holds nothing to analyse
const EXIT_NO_DATA: u8 = 2;

/// memlens CLI
#[derive(Parser)]
#[command(name = "memlens")]
#[command(
    author,
    version,
    about = "Memory telemetry analyzer for long-running processes",
    long_about = None
)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Configuration file (defaults to ~/.config/memlens/config.json)
    #[arg(long, short, global = true, env = "MEMLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze memory samples recorded in a log file
    Logs {
        /// Log file to scan
        #[arg(long, short)]
        log: PathBuf,

        /// Write extracted samples to a file (CSV for .csv, JSON otherwise)
        #[arg(long, short)]
        export: Option<PathBuf>,

        /// Skip the hourly window table
        #[arg(long)]
        no_windows: bool,
    },

    /// Rank modules from a live memory snapshot
    Live {
        /// Base URL of the introspection endpoint
        #[arg(long, short, env = "MEMLENS_URL")]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Number of modules to list (0 for all)
        #[arg(long, short, default_value_t = 10)]
        top: usize,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,memlens=debug,memlens_lib=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let json = std::env::var("MEMLENS_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = config::load(cli.config.as_deref())?;
    debug!(
        marker = %config.marker,
        bucket_secs = config.bucket_secs,
        base_url = %config.live.base_url,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Logs {
            log,
            export,
            no_windows,
        } => {
            logs::analyze_log(&config, &log, export.as_deref(), !no_windows, cli.format)?;
        }
        Commands::Live {
            url,
            timeout_secs,
            top,
        } => {
            if let Some(url) = url {
                config.live.base_url = url;
            }
            if let Some(secs) = timeout_secs {
                config.live.timeout_secs = secs;
            }

            let client = client::ApiClient::new(&config.live.base_url, config.live.timeout())?;
            live::show_modules(&client, &config, top, cli.format).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let no_data = err
                .chain()
                .filter_map(|cause| cause.downcast_ref::<AnalysisError>())
                .any(AnalysisError::is_no_data);

            if no_data {
                output::print_warning(&err.to_string());
                ExitCode::from(EXIT_NO_DATA)
            } else {
                output::print_error(&format!("{:#}", err));
                ExitCode::FAILURE
            }
        }
    }
}
