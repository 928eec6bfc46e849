//! Subject line classification.
//!
//! Precedence, highest first:
//! 1. a job that did not complete successfully → `[ERROR]`
//! 2. a threshold breach (forced or skipped sync) → `[WARNING]`
//! 3. otherwise → `[COMPLETED]`

use serde::Serialize;

use raidkeeper_core::{Breach, ChangeSummary, RunOutcome, SyncDecision, ThresholdConfig};

/// Severity class of a report. Drives the subject tag and the health-check
/// ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Completed,
    Warning,
    Error,
}

impl Severity {
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Completed => "[COMPLETED]",
            Severity::Warning => "[WARNING]",
            Severity::Error => "[ERROR]",
        }
    }
}

/// Classify a finished run. The returned subject carries no prefix.
pub fn classify(outcome: &RunOutcome) -> (Severity, String) {
    if let Some(failed) = outcome.failed_steps().next() {
        return (
            Severity::Error,
            format!("{} {} job did not complete successfully", Severity::Error.tag(), failed.job),
        );
    }

    if let (Some(decision), Some(summary)) = (outcome.sync_decision, outcome.summary) {
        if let Some(subject) = breach_subject(&decision, &summary, &outcome.thresholds) {
            return (Severity::Warning, subject);
        }
    }

    let jobs = if outcome.jobs.is_empty() {
        "No".to_string()
    } else {
        outcome.jobs_label()
    };
    (
        Severity::Completed,
        format!("{} {jobs} Jobs", Severity::Completed.tag()),
    )
}

/// Subject for a run aborted before any decision could be made.
pub fn fatal(reason: &str) -> (Severity, String) {
    (Severity::Error, format!("{} {reason}", Severity::Error.tag()))
}

/// One of the six breach variants, or `None` when the decision involved no
/// breach.
pub fn breach_subject(
    decision: &SyncDecision,
    summary: &ChangeSummary,
    thresholds: &ThresholdConfig,
) -> Option<String> {
    let tag = Severity::Warning.tag();
    let text = match decision {
        SyncDecision::RunForced { breach } => match breach {
            Breach::Delete => "Sync forced with deleted files threshold violation".to_string(),
            Breach::Update => "Sync forced with updated files threshold violation".to_string(),
            Breach::Both => "Sync forced with multiple threshold violations".to_string(),
        },
        SyncDecision::SkipWarn { breach, .. } => match breach {
            Breach::Delete => format!(
                "Sync skipped: deleted files ({}) reached or exceeded threshold ({})",
                summary.removed, thresholds.delete_threshold
            ),
            Breach::Update => format!(
                "Sync skipped: updated files ({}) reached or exceeded threshold ({})",
                summary.updated, thresholds.update_threshold
            ),
            Breach::Both => "Sync skipped: multiple threshold violations".to_string(),
        },
        SyncDecision::Skip | SyncDecision::Run => return None,
    };
    Some(format!("{tag} {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use raidkeeper_core::{Job, StepResult};

    fn summary() -> ChangeSummary {
        ChangeSummary { added: 1, removed: 600, updated: 700, moved: 0, copied: 0 }
    }

    fn outcome_with(decision: SyncDecision) -> RunOutcome {
        let mut o = RunOutcome::new(ThresholdConfig::default(), Utc::now());
        o.summary = Some(summary());
        o.sync_decision = Some(decision);
        o
    }

    fn ok_step(job: Job) -> StepResult {
        StepResult {
            job,
            completed: true,
            exit_status: Some(0),
            saw_completion_marker: true,
            output: String::new(),
        }
    }

    #[test]
    fn six_breach_variants_are_distinct() {
        let t = ThresholdConfig::default();
        let s = summary();
        let mut subjects = Vec::new();
        for breach in [Breach::Delete, Breach::Update, Breach::Both] {
            subjects.push(breach_subject(&SyncDecision::RunForced { breach }, &s, &t).unwrap());
            subjects.push(
                breach_subject(
                    &SyncDecision::SkipWarn { breach, warnings: None, last_warning: false },
                    &s,
                    &t,
                )
                .unwrap(),
            );
        }
        let mut unique = subjects.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 6, "{subjects:?}");
        assert!(subjects.iter().all(|s| s.starts_with("[WARNING]")));
    }

    #[test]
    fn skipped_delete_mentions_counts() {
        let subject = breach_subject(
            &SyncDecision::SkipWarn { breach: Breach::Delete, warnings: Some(1), last_warning: false },
            &summary(),
            &ThresholdConfig::default(),
        )
        .unwrap();
        assert!(subject.contains("(600)") && subject.contains("(500)"), "{subject}");
    }

    #[test]
    fn no_breach_no_warning_subject() {
        let t = ThresholdConfig::default();
        assert!(breach_subject(&SyncDecision::Run, &summary(), &t).is_none());
        assert!(breach_subject(&SyncDecision::Skip, &summary(), &t).is_none());
    }

    #[test]
    fn completed_subject_lists_jobs() {
        let mut o = outcome_with(SyncDecision::Run);
        o.record(ok_step(Job::Diff));
        o.record(ok_step(Job::Sync));
        let (severity, subject) = classify(&o);
        assert_eq!(severity, Severity::Completed);
        assert_eq!(subject, "[COMPLETED] DIFF + SYNC Jobs");
    }

    #[test]
    fn failed_job_outranks_warning() {
        let mut o = outcome_with(SyncDecision::RunForced { breach: Breach::Both });
        o.record(ok_step(Job::Diff));
        let mut sync = ok_step(Job::Sync);
        sync.saw_completion_marker = false;
        o.record(sync);
        let (severity, subject) = classify(&o);
        assert_eq!(severity, Severity::Error);
        assert_eq!(subject, "[ERROR] SYNC job did not complete successfully");
    }

    #[test]
    fn warning_when_all_steps_ok() {
        let mut o = outcome_with(SyncDecision::RunForced { breach: Breach::Update });
        o.record(ok_step(Job::Diff));
        o.record(ok_step(Job::Sync));
        let (severity, subject) = classify(&o);
        assert_eq!(severity, Severity::Warning);
        assert!(subject.contains("updated files threshold"));
    }

    #[test]
    fn fatal_subject() {
        assert_eq!(
            fatal("Missing parity file"),
            (Severity::Error, "[ERROR] Missing parity file".to_string())
        );
    }
}
