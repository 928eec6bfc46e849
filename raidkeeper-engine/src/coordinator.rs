//! Run coordinator: one maintenance run, start to finish.
//!
//! Order of events:
//!
//! 1. Discover the array layout and check every content and parity file.
//! 2. Run `diff` and parse its counts.
//! 3. Decide on sync, run it if allowed, clear the warning counter.
//! 4. Decide on scrub, run it if allowed, clear the delay counter.
//! 5. Post-processing: touch, SMART report, status report, spin-down.
//! 6. Build the report from the run log and send it.
//!
//! Steps 1 and 2 can abort the run. An abort still produces a diagnostic
//! report before the error is returned.

use chrono::Utc;

use raidkeeper_core::{Config, CounterKind, CounterStore, Job, RunOutcome, StepResult};
use raidkeeper_report::ReportBuilder;

use crate::error::RunError;
use crate::executor::{self, ArrayTool};
use crate::notify::Notifier;
use crate::parser::parse_change_summary;
use crate::policy;
use crate::runlog::RunLog;

/// Everything a run needs, passed explicitly to every stage.
pub struct RunContext<T, N> {
    pub config: Config,
    pub counters: CounterStore,
    pub tool: T,
    pub notifier: N,
    pub log: RunLog,
    pub reports: ReportBuilder,
}

impl<T: ArrayTool, N: Notifier> RunContext<T, N> {
    pub fn new(config: Config, tool: T, notifier: N, log: RunLog) -> Result<Self, RunError> {
        let counters = CounterStore::from_paths(&config.paths);
        let reports = ReportBuilder::new(config.notify.subject_prefix.clone())?;
        Ok(Self {
            config,
            counters,
            tool,
            notifier,
            log,
            reports,
        })
    }
}

/// Execute one run. Returns the outcome of a run that reached the end of
/// its sequence (whatever the individual steps did), or the fatal error
/// that aborted it.
pub fn run<T: ArrayTool, N: Notifier>(ctx: &mut RunContext<T, N>) -> Result<RunOutcome, RunError> {
    let mut outcome = RunOutcome::new(ctx.config.thresholds, Utc::now());
    ctx.notifier.run_started();

    match sequence(ctx, &mut outcome) {
        Ok(()) => {
            finish(ctx, &mut outcome)?;
            Ok(outcome)
        }
        Err(err) => {
            abort(ctx, &mut outcome, &err);
            Err(err)
        }
    }
}

fn sequence<T: ArrayTool, N: Notifier>(
    ctx: &mut RunContext<T, N>,
    outcome: &mut RunOutcome,
) -> Result<(), RunError> {
    let layout = raidkeeper_detector::discover_for(&ctx.config)?;
    let missing = layout.missing_artifacts();
    if !missing.is_empty() {
        return Err(RunError::ArtifactMissing {
            paths: missing.into_iter().map(|a| a.path).collect(),
        });
    }
    tracing::debug!(
        parity_files = layout.parity_files.len(),
        data_disks = layout.data_disks.len(),
        "array layout checked"
    );

    let diff = step(ctx, outcome, Job::Diff);
    let summary = parse_change_summary(&diff.output)?;
    outcome.summary = Some(summary);
    tracing::info!(
        added = summary.added,
        removed = summary.removed,
        updated = summary.updated,
        moved = summary.moved,
        copied = summary.copied,
        "changes detected"
    );

    let sync = policy::decide_sync(&summary, &ctx.config.thresholds, &ctx.counters);
    outcome.sync_decision = Some(sync);
    tracing::info!(decision = ?sync, "sync decision");

    let sync_step = if sync.runs_sync() {
        let result = step(ctx, outcome, Job::Sync);
        clear(&ctx.counters, CounterKind::SyncWarn);
        Some(result)
    } else {
        None
    };

    let scrub = policy::decide_scrub(
        ctx.config.scrub.percent,
        &sync,
        sync_step.as_ref(),
        ctx.config.thresholds.scrub_delayed_runs,
        &ctx.counters,
    );
    outcome.scrub_decision = Some(scrub);
    tracing::info!(decision = ?scrub, "scrub decision");

    if scrub.runs_scrub() {
        if ctx.config.scrub.scrub_new {
            step(ctx, outcome, Job::ScrubNew);
        }
        step(ctx, outcome, Job::Scrub);
        clear(&ctx.counters, CounterKind::ScrubDelay);
    }

    let post = ctx.config.post.clone();
    for (enabled, job) in [
        (post.touch, Job::Touch),
        (post.smart_report, Job::Smart),
        (post.status_report, Job::Status),
        (post.spin_down, Job::Down),
    ] {
        if enabled {
            step(ctx, outcome, job);
        }
    }
    Ok(())
}

fn step<T: ArrayTool, N: Notifier>(
    ctx: &mut RunContext<T, N>,
    outcome: &mut RunOutcome,
    job: Job,
) -> StepResult {
    if let Err(err) = ctx.log.header(job) {
        tracing::warn!(job = %job, error = %err, "failed to write run log header");
    }
    let args = executor::args_for(job, &ctx.config);
    let result = executor::execute(
        &mut ctx.tool,
        job,
        &args,
        &ctx.config.array_tool.completion_markers,
        &mut ctx.log,
    );
    outcome.record(result.clone());
    result
}

fn clear(counters: &CounterStore, kind: CounterKind) {
    if let Err(err) = counters.clear(kind) {
        tracing::warn!(counter = %kind, error = %err, "failed to clear counter");
    }
}

fn finish<T: ArrayTool, N: Notifier>(
    ctx: &mut RunContext<T, N>,
    outcome: &mut RunOutcome,
) -> Result<(), RunError> {
    outcome.finished_at = Some(Utc::now());
    let log = transcript_or_steps(&mut ctx.log, outcome);
    let report = ctx.reports.build(outcome, &log)?;
    tracing::info!(subject = %report.subject, "run finished");
    deliver(&mut ctx.notifier, &report);
    Ok(())
}

fn abort<T: ArrayTool, N: Notifier>(
    ctx: &mut RunContext<T, N>,
    outcome: &mut RunOutcome,
    err: &RunError,
) {
    tracing::error!(error = %err, "run aborted");
    if let Err(e) = ctx.log.line(&format!("\nRun aborted: {err}")) {
        tracing::warn!(error = %e, "failed to write run log");
    }
    outcome.finished_at = Some(Utc::now());
    let log = transcript_or_steps(&mut ctx.log, outcome);
    match ctx
        .reports
        .build_fatal(outcome, err.subject(), &err.to_string(), &log)
    {
        Ok(report) => deliver(&mut ctx.notifier, &report),
        Err(e) => tracing::error!(error = %e, "failed to build diagnostic report"),
    }
}

/// The run log as written, or the captured step output when it cannot be
/// read back.
fn transcript_or_steps(log: &mut RunLog, outcome: &RunOutcome) -> String {
    log.transcript().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to read run log back, reporting captured output");
        outcome
            .steps
            .iter()
            .map(|s| format!("\n### {}\n{}", s.job.label(), s.output))
            .collect()
    })
}

fn deliver<N: Notifier>(notifier: &mut N, report: &raidkeeper_report::Report) {
    if let Err(err) = notifier.send(report) {
        tracing::error!(subject = %report.subject, error = %err, "notification failed");
    }
}
