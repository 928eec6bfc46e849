//! `raidkeeper run`: one full maintenance run.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use raidkeeper_engine::pipeline;
use raidkeeper_exec::{Notifiers, ProcessArrayTool};

/// Arguments for `raidkeeper run`.
#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = crate::load_config(config_path)?;
        let tool = ProcessArrayTool::new(&config.array_tool.binary)
            .context("failed to prepare array tool runner")?;
        let notifier = Notifiers::from_config(&config.notify);

        let outcome = pipeline::run(config, tool, notifier).context("run aborted")?;
        tracing::info!(
            jobs = %outcome.jobs_label(),
            failed = outcome.failed_steps().count(),
            "run complete"
        );
        Ok(())
    }
}
