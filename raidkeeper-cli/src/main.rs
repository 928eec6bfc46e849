//! raidkeeper: unattended maintenance runs for a snapshot parity array.
//!
//! # Usage
//!
//! ```text
//! raidkeeper [--config <path>] run
//! raidkeeper [--config <path>] counters show [--json]
//! raidkeeper [--config <path>] counters reset [--kind sync-warn|scrub-delay]
//! raidkeeper [--config <path>] layout [--json]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{counters::CountersCommand, layout::LayoutArgs, run::RunArgs};
use raidkeeper_core::{config, Config};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "raidkeeper",
    version,
    about = "Threshold-guarded sync and scrub runs for a parity array",
    long_about = None,
)]
struct Cli {
    /// Configuration file (default: user config dir, then /etc/raidkeeper/config.yaml).
    #[arg(long, global = true, env = "RAIDKEEPER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one maintenance pass: diff, sync, scrub, post-processing, report.
    Run(RunArgs),

    /// Inspect or reset the persisted counters.
    Counters {
        #[command(subcommand)]
        command: CountersCommand,
    },

    /// Show the array layout read from the array tool configuration.
    Layout(LayoutArgs),
}

/// Load the configuration named on the command line (or the default one).
pub(crate) fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    let path = config::resolve_path(explicit);
    config::load_at(&path).with_context(|| format!("failed to load {}", path.display()))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    raidkeeper_exec::init_tracing();
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => args.run(config),
        Commands::Counters { command } => commands::counters::run(command, config),
        Commands::Layout(args) => args.run(config),
    }
}
