//! `raidkeeper counters`: inspect and reset the persisted counters.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use raidkeeper_core::{CounterKind, CounterStore};

#[derive(Subcommand, Debug)]
pub enum CountersCommand {
    /// Print both counters and where they are stored.
    Show {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Clear one counter, or both when no kind is given.
    Reset {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
}

/// Counter selector for `counters reset --kind`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    SyncWarn,
    ScrubDelay,
}

impl From<KindArg> for CounterKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::SyncWarn => CounterKind::SyncWarn,
            KindArg::ScrubDelay => CounterKind::ScrubDelay,
        }
    }
}

#[derive(Serialize)]
struct CounterJson {
    kind: CounterKind,
    value: u32,
    path: String,
    exists: bool,
}

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "counter")]
    kind: String,
    #[tabled(rename = "value")]
    value: u32,
    #[tabled(rename = "file")]
    path: String,
}

pub fn run(command: CountersCommand, config_path: Option<&Path>) -> Result<()> {
    let config = crate::load_config(config_path)?;
    let store = CounterStore::from_paths(&config.paths);
    match command {
        CountersCommand::Show { json } => show(&store, json),
        CountersCommand::Reset { kind } => reset(&store, kind),
    }
}

fn show(store: &CounterStore, json: bool) -> Result<()> {
    let counters: Vec<CounterJson> = CounterKind::all()
        .iter()
        .map(|&kind| CounterJson {
            kind,
            value: store.read(kind),
            path: store.path(kind).display().to_string(),
            exists: store.exists(kind),
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&counters).context("failed to serialize counters")?
        );
        return Ok(());
    }

    let rows: Vec<CounterRow> = counters
        .into_iter()
        .map(|c| CounterRow {
            kind: c.kind.to_string(),
            value: c.value,
            path: if c.exists {
                c.path
            } else {
                format!("{} (absent)", c.path)
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", "Counters".bold());
    println!("{table}");
    Ok(())
}

fn reset(store: &CounterStore, kind: Option<KindArg>) -> Result<()> {
    let kinds: Vec<CounterKind> = match kind {
        Some(k) => vec![k.into()],
        None => CounterKind::all().to_vec(),
    };
    for kind in kinds {
        store
            .clear(kind)
            .with_context(|| format!("failed to clear {kind} counter"))?;
        println!("{} {kind} ({})", "cleared".green(), store.path(kind).display());
    }
    Ok(())
}
