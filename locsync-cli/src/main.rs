//! locsync: keep localization tables in sync across spreadsheet, cache and Gridly.
//!
//! # Usage
//!
//! ```text
//! locsync [--config <path>] sync [--dry-run]
//! locsync [--config <path>] diff [--table static-texts|game-text]
//! locsync [--config <path>] status [--json]
//! locsync [--config <path>] init
//! ```
//!
//! Settings come from the environment, `.env` and the optional YAML file.
//! Log verbosity follows `RUST_LOG` (default `warn`).

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, init::InitArgs, status::StatusArgs, sync::SyncArgs};
use locsync_core::{Config, LogicalTable};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "locsync",
    version,
    about = "Propagate localization changes from the spreadsheet to the cache and Gridly",
    long_about = None,
)]
struct Cli {
    /// YAML settings file; environment variables take precedence over it.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push new and changed spreadsheet rows to the cache and Gridly.
    Sync(SyncArgs),

    /// Show field-level diffs of what sync would write.
    Diff(DiffArgs),

    /// Compare row counts and pending changes across the three stores.
    Status(StatusArgs),

    /// Create and seed the cache database (once).
    Init(InitArgs),
}

// ---------------------------------------------------------------------------
// Shared LogicalTable argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse a `LogicalTable` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct TableArg(pub LogicalTable);

impl FromStr for TableArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "static-texts" | "static" => Ok(Self(LogicalTable::StaticTexts)),
            "game-text" | "game" => Ok(Self(LogicalTable::GameText)),
            other => Err(format!(
                "unknown table '{other}'; expected: static-texts, game-text"
            )),
        }
    }
}

impl fmt::Display for TableArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Sync(args) => args.run(&config),
        Commands::Diff(args) => args.run(&config),
        Commands::Status(args) => args.run(&config),
        Commands::Init(args) => args.run(&config),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
