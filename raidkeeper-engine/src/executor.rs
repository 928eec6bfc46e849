//! Array-tool invocation: argument building and step result capture.

use std::io::{self, Write};

use raidkeeper_core::{Config, Job, StepResult};

/// Raw result of one array-tool process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_status: Option<i32>,
    /// Combined stdout and stderr, in arrival order.
    pub output: String,
}

/// Something that can run the array tool with a given argument list.
///
/// Implementations must stream the process output into `log` while it runs
/// and return only after both output streams are drained.
pub trait ArrayTool {
    fn invoke(&mut self, args: &[String], log: &mut dyn Write) -> io::Result<ToolOutput>;
}

impl<T: ArrayTool + ?Sized> ArrayTool for &mut T {
    fn invoke(&mut self, args: &[String], log: &mut dyn Write) -> io::Result<ToolOutput> {
        (**self).invoke(args, log)
    }
}

impl<T: ArrayTool + ?Sized> ArrayTool for Box<T> {
    fn invoke(&mut self, args: &[String], log: &mut dyn Write) -> io::Result<ToolOutput> {
        (**self).invoke(args, log)
    }
}

/// Full argument list for `job`, including the `-c <config>` prefix.
pub fn args_for(job: Job, config: &Config) -> Vec<String> {
    let mut args = vec![
        "-c".to_string(),
        config.array_tool.config_file.display().to_string(),
        job.subcommand().to_string(),
    ];
    match job {
        Job::Sync => {
            if config.sync.prehash {
                args.push("-h".into());
            }
            if config.sync.force_zero {
                args.push("--force-zero".into());
            }
        }
        Job::Scrub => {
            args.push("-p".into());
            args.push(config.scrub.percent.to_string());
            args.push("-o".into());
            args.push(config.scrub.age_days.to_string());
        }
        Job::ScrubNew => {
            args.push("-p".into());
            args.push("new".into());
        }
        _ => {}
    }
    if config.array_tool.quiet && matches!(job, Job::Sync | Job::Scrub | Job::ScrubNew) {
        args.push("-q".into());
    }
    args
}

/// Run one step and turn the process result into a [`StepResult`].
///
/// A process that cannot be started yields a not-completed result; the
/// error is logged, never propagated.
pub fn execute(
    tool: &mut dyn ArrayTool,
    job: Job,
    args: &[String],
    markers: &[String],
    log: &mut dyn Write,
) -> StepResult {
    tracing::info!(job = %job, args = %args.join(" "), "starting step");
    match tool.invoke(args, log) {
        Ok(out) => {
            let saw_completion_marker = has_marker_line(&out.output, markers);
            let step = StepResult {
                job,
                completed: out.exit_status.is_some(),
                exit_status: out.exit_status,
                saw_completion_marker,
                output: out.output,
            };
            tracing::info!(
                job = %job,
                exit_status = ?step.exit_status,
                marker = step.saw_completion_marker,
                "step finished"
            );
            step
        }
        Err(err) => {
            tracing::error!(job = %job, error = %err, "step could not be started");
            if let Err(e) = writeln!(log, "{job} could not be started: {err}") {
                tracing::warn!(job = %job, error = %e, "failed to write run log");
            }
            StepResult::not_started(job)
        }
    }
}

/// True when some output line, trimmed, equals one of the non-blank markers.
fn has_marker_line(output: &str, markers: &[String]) -> bool {
    output.lines().map(str::trim).any(|line| {
        markers
            .iter()
            .map(|m| m.trim())
            .any(|m| !m.is_empty() && m == line)
    })
}
