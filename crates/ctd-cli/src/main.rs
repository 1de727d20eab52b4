//! ctd CLI tool.
//!
//! Usage:
//! ```bash
//! ctd scan [OPTIONS] [PATH]
//! ctd list-rules
//! ctd init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Documents where a TypeScript project reports errors
#[derive(Parser)]
#[command(name = "ctd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CTD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project and write the report
    Scan {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Report file (default: `output.path` from config, else analysisResults.md)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Only run specific rules (comma-separated keys)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Also write each rule section to its own result path
        #[arg(long)]
        split: bool,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Report format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// One Markdown table per rule and domain.
    #[default]
    Markdown,
    /// The aggregate as JSON.
    Json,
    /// Entry counts per rule and domain, printed to stdout.
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            path,
            output,
            format,
            rules,
            exclude,
            split,
        } => {
            let loaded = config_resolver::load(&path, cli.config.as_deref())?;
            commands::scan::run(
                &path,
                &commands::scan::ScanOptions {
                    output,
                    format,
                    rules,
                    exclude,
                    split,
                },
                loaded,
            )
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
