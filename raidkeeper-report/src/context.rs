//! Report context: serializable rendering payload built from a
//! [`RunOutcome`] and the run log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use raidkeeper_core::{
    ChangeSummary, RunOutcome, ScrubDecision, StepResult, SyncDecision, ThresholdConfig,
};

use crate::error::ReportError;
use crate::subject::Severity;

/// Everything the report templates can reference.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub subject: String,
    pub severity: Severity,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Human-readable elapsed time, empty when the run has no end time.
    pub elapsed: String,
    pub jobs: String,
    pub summary: Option<ChangeSummary>,
    pub thresholds: ThresholdConfig,
    pub sync: Option<DecisionCtx>,
    pub scrub: Option<DecisionCtx>,
    pub steps: Vec<StepCtx>,
    /// Call-outs such as "last warning" or "last deferred run".
    pub notes: Vec<String>,
    /// Reason a run was aborted, for diagnostic reports.
    pub fatal: Option<String>,
    pub log: String,
    pub version: String,
}

/// A policy decision rendered for humans.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionCtx {
    pub decision: String,
    pub reason: String,
}

/// One executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepCtx {
    pub job: String,
    pub status: String,
    pub exit_status: String,
    pub marker: bool,
}

impl ReportContext {
    /// Context for a run that reached the end of its sequence.
    pub fn from_outcome(
        outcome: &RunOutcome,
        severity: Severity,
        subject: String,
        log: String,
    ) -> Self {
        let mut notes = Vec::new();
        if let Some(SyncDecision::SkipWarn { last_warning: true, .. }) = outcome.sync_decision {
            notes.push(
                "This is the last warning: the next run with the same violation will force a sync."
                    .to_string(),
            );
        }
        if let Some(ScrubDecision::SkipDelayed { last_deferred: true, .. }) = outcome.scrub_decision
        {
            notes.push("Last deferred run: the next eligible run will scrub.".to_string());
        }

        Self {
            subject,
            severity,
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            elapsed: elapsed(outcome.started_at, outcome.finished_at),
            jobs: outcome.jobs_label(),
            summary: outcome.summary,
            thresholds: outcome.thresholds,
            sync: outcome
                .sync_decision
                .map(|d| describe_sync(&d, &outcome.thresholds)),
            scrub: outcome.scrub_decision.map(|d| describe_scrub(&d)),
            steps: outcome.steps.iter().map(StepCtx::from).collect(),
            notes,
            fatal: None,
            log,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Context for a run aborted by a fatal precondition failure.
    pub fn fatal(outcome: &RunOutcome, subject: String, reason: String, log: String) -> Self {
        let mut ctx = Self::from_outcome(outcome, Severity::Error, subject, log);
        ctx.fatal = Some(reason);
        ctx
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, ReportError> {
        tera::Context::from_serialize(self).map_err(ReportError::from)
    }
}

impl From<&StepResult> for StepCtx {
    fn from(step: &StepResult) -> Self {
        let status = if !step.completed {
            "not completed"
        } else if step.succeeded() {
            "ok"
        } else {
            "failed"
        };
        StepCtx {
            job: step.job.label().to_string(),
            status: status.to_string(),
            exit_status: step
                .exit_status
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            marker: step.saw_completion_marker,
        }
    }
}

fn describe_sync(decision: &SyncDecision, thresholds: &ThresholdConfig) -> DecisionCtx {
    let (name, reason) = match decision {
        SyncDecision::Skip => ("skipped", "no changes detected".to_string()),
        SyncDecision::Run => ("run", "changes are below thresholds".to_string()),
        SyncDecision::RunForced { breach } => (
            "forced",
            format!(
                "{} threshold breached; warning limit ({}) reached",
                breach_name(*breach),
                thresholds.sync_warn_threshold
            ),
        ),
        SyncDecision::SkipWarn { breach, warnings, .. } => {
            let count = match warnings {
                Some(n) if thresholds.sync_warn_threshold > 0 => {
                    format!(" (warning {n} of {})", thresholds.sync_warn_threshold)
                }
                _ => String::new(),
            };
            ("skipped", format!("{} threshold breached{count}", breach_name(*breach)))
        }
    };
    DecisionCtx {
        decision: name.to_string(),
        reason,
    }
}

fn describe_scrub(decision: &ScrubDecision) -> DecisionCtx {
    let (name, reason) = match decision {
        ScrubDecision::Run => ("run", "scrub is due".to_string()),
        ScrubDecision::Skip { reason } => ("skipped", reason.to_string()),
        ScrubDecision::SkipDelayed { deferred, .. } => {
            ("delayed", format!("deferred run {deferred}"))
        }
    };
    DecisionCtx {
        decision: name.to_string(),
        reason,
    }
}

fn breach_name(breach: raidkeeper_core::Breach) -> &'static str {
    match breach {
        raidkeeper_core::Breach::Delete => "delete",
        raidkeeper_core::Breach::Update => "update",
        raidkeeper_core::Breach::Both => "delete and update",
    }
}

fn elapsed(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> String {
    let Some(end) = end else {
        return String::new();
    };
    let secs = (end - start).num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use raidkeeper_core::{Breach, Job, ScrubSkipReason};

    #[test]
    fn elapsed_formats() {
        let start = Utc::now();
        assert_eq!(elapsed(start, None), "");
        assert_eq!(elapsed(start, Some(start + Duration::seconds(42))), "42s");
        assert_eq!(elapsed(start, Some(start + Duration::seconds(125))), "2m 5s");
        assert_eq!(elapsed(start, Some(start + Duration::seconds(3723))), "1h 2m 3s");
    }

    #[test]
    fn last_warning_and_last_deferred_notes() {
        let mut o = RunOutcome::new(ThresholdConfig::default(), Utc::now());
        o.sync_decision = Some(SyncDecision::SkipWarn {
            breach: Breach::Delete,
            warnings: Some(2),
            last_warning: true,
        });
        o.scrub_decision = Some(ScrubDecision::SkipDelayed { deferred: 3, last_deferred: true });
        let ctx = ReportContext::from_outcome(&o, Severity::Warning, "s".into(), String::new());
        assert_eq!(ctx.notes.len(), 2);
        assert!(ctx.notes[0].contains("last warning"));
    }

    #[test]
    fn step_ctx_statuses() {
        let not_started = StepCtx::from(&StepResult::not_started(Job::Smart));
        assert_eq!(not_started.status, "not completed");
        assert_eq!(not_started.exit_status, "-");
    }

    #[test]
    fn scrub_skip_reason_is_rendered() {
        let d = describe_scrub(&ScrubDecision::Skip { reason: ScrubSkipReason::SyncNotConfirmed });
        assert_eq!(d.decision, "skipped");
        assert_eq!(d.reason, "sync did not confirm success");
    }

    #[test]
    fn to_tera_context_succeeds() {
        let o = RunOutcome::new(ThresholdConfig::default(), Utc::now());
        let ctx = ReportContext::from_outcome(&o, Severity::Completed, "s".into(), "log".into());
        ctx.to_tera_context().expect("context conversion");
    }
}
