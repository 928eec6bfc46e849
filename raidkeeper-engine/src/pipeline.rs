//! Entrypoint used by the `run` command.

use std::io::Write;

use raidkeeper_core::{Config, RunOutcome};

use crate::coordinator::{self, RunContext};
use crate::error::RunError;
use crate::executor::ArrayTool;
use crate::notify::Notifier;
use crate::runlog::RunLog;

/// Run once with output echoed to stdout.
pub fn run<T: ArrayTool, N: Notifier>(
    config: Config,
    tool: T,
    notifier: N,
) -> Result<RunOutcome, RunError> {
    run_with_console(config, tool, notifier, Box::new(std::io::stdout()))
}

/// Run once, echoing step output to `console`.
pub fn run_with_console<T: ArrayTool, N: Notifier>(
    config: Config,
    tool: T,
    notifier: N,
    console: Box<dyn Write + Send>,
) -> Result<RunOutcome, RunError> {
    let log = RunLog::create(&config.paths.run_log_path(), console)?;
    tracing::info!(run_log = %log.path().display(), "run started");
    let mut ctx = RunContext::new(config, tool, notifier, log)?;
    coordinator::run(&mut ctx)
}
