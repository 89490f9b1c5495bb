//! Blueprints - keeps a blueprint registry in sync with tagged releases
//!
//! Main entry point: parses flags and environment, initialises logging and
//! dispatches to the `sync` and `list` commands.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod list_cli;
mod sync_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "blueprints",
    about = "Keep a blueprint registry in sync with tagged releases",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level (RUST_LOG takes precedence when set)
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Merge the blueprints of a release into the registry
    Sync(sync_cli::SyncArgs),

    /// Show the blueprints in a registry
    List {
        /// Registry file
        #[clap(long, env = "REGISTRY_PATH", default_value = "registry.json")]
        registry: PathBuf,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Initialize tracing from CLI flags
///
/// Logs always go to stderr; stdout carries command output only.
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync(args) => sync_cli::execute(args).await,
        Command::List { registry, json } => {
            list_cli::execute(&registry, json).with_context(|| {
                format!("Failed to list registry {}", registry.display())
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
