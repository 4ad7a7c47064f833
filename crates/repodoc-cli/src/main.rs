// SPDX-License-Identifier: AGPL-3.0-or-later
//! Repodoc CLI - localised repository analysis reports
//!
//! Provides commands for:
//! - `export`: turn a markdown analysis into a Markdown or PDF report
//! - `analyze`: fetch a GitHub repository and generate its analysis

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{AnalyzeArgs, ExportArgs};
use config::AppConfig;

/// Repodoc - repository analysis reports.
#[derive(Parser)]
#[command(name = "repodoc", version, about)]
struct Cli {
    /// Log at info level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "REPODOC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a markdown analysis as a report.
    Export(ExportArgs),
    /// Analyze a GitHub repository.
    Analyze(AnalyzeArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Export(args) => args.execute().await,
        Commands::Analyze(args) => match AppConfig::load(cli.config.as_deref()) {
            Ok(config) => args.execute(&config).await,
            Err(err) => Err(err),
        },
    };

    if let Err(err) = result {
        tracing::error!("{err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
