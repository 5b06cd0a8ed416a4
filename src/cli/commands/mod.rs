//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod serve;
mod tools;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "stmtx")]
#[command(about = "Convert bank statement PDFs into spreadsheets")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the upload/download web server
    Serve {
        /// Address to bind to (port, host, or host:port)
        #[arg(default_value = "127.0.0.1:3000")]
        bind: String,
    },

    /// Extract transaction rows from a statement PDF
    Extract {
        /// Statement PDF to read
        input: PathBuf,
        /// Workbook to write (defaults to the input name with .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the row table as JSON instead of writing a workbook
        #[arg(long)]
        json: bool,
    },

    /// Show which external extraction tools are installed
    Tools,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, config) = load_settings_with_options(options).await;
    if let Some(ref path) = config.source_path {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Extract {
            input,
            output,
            json,
        } => extract::cmd_extract(&settings, &input, output.as_deref(), json).await,
        Commands::Tools => tools::cmd_tools(&settings),
    }
}
