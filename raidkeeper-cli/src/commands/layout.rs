//! `raidkeeper layout`: what the array tool configuration describes.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use raidkeeper_detector::{discover_for, ArrayLayout, ArtifactKind, ArtifactStatus};

/// Arguments for `raidkeeper layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct LayoutJson<'a> {
    layout: &'a ArrayLayout,
    artifacts: Vec<ArtifactStatus>,
}

#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "status")]
    status: String,
}

impl LayoutArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = crate::load_config(config_path)?;
        let layout = discover_for(&config).with_context(|| {
            format!(
                "failed to read array configuration {}",
                config.array_tool.config_file.display()
            )
        })?;
        let artifacts = layout.check_artifacts();

        if self.json {
            let payload = LayoutJson {
                layout: &layout,
                artifacts,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize layout")?
            );
            return Ok(());
        }

        print_table(&layout, artifacts);
        Ok(())
    }
}

fn print_table(layout: &ArrayLayout, artifacts: Vec<ArtifactStatus>) {
    println!("{} {}", "Array configuration:".bold(), layout.source.display());

    let missing = artifacts.iter().filter(|a| !a.present).count();
    let rows: Vec<ArtifactRow> = artifacts
        .into_iter()
        .map(|a| ArtifactRow {
            kind: match a.kind {
                ArtifactKind::Content => "content".to_string(),
                ArtifactKind::Parity => "parity".to_string(),
            },
            path: a.path.display().to_string(),
            status: if a.present {
                "present".green().to_string()
            } else {
                "MISSING".red().bold().to_string()
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !layout.data_disks.is_empty() {
        println!("{}", "Data disks".bold());
        for disk in &layout.data_disks {
            println!("  {:<10} {}", disk.name, disk.path.display());
        }
    }

    if missing > 0 {
        println!(
            "{}",
            format!("{missing} required file(s) missing; runs will abort until restored.").red()
        );
    }
}
