//! Threshold policy: whether to sync and whether to scrub.
//!
//! Both decisions may advance their counter. Clearing a counter is left to
//! the coordinator, which does it once the corresponding step has actually
//! executed.

use raidkeeper_core::{
    Breach, ChangeSummary, CounterKind, CounterStore, ScrubDecision, ScrubSkipReason, StepResult,
    SyncDecision, ThresholdConfig,
};

/// Decide whether this run syncs.
pub fn decide_sync(
    summary: &ChangeSummary,
    thresholds: &ThresholdConfig,
    counters: &CounterStore,
) -> SyncDecision {
    if summary.is_empty() {
        return SyncDecision::Skip;
    }

    let delete = summary.removed >= thresholds.delete_threshold;
    let update = summary.updated >= thresholds.update_threshold;
    let Some(breach) = Breach::classify(delete, update) else {
        return SyncDecision::Run;
    };

    let limit = thresholds.sync_warn_threshold;
    if limit < 0 {
        return SyncDecision::SkipWarn {
            breach,
            warnings: None,
            last_warning: false,
        };
    }
    if limit == 0 {
        return SyncDecision::RunForced { breach };
    }

    let current = counters.read(CounterKind::SyncWarn);
    if i64::from(current) >= limit {
        return SyncDecision::RunForced { breach };
    }

    let next = current.saturating_add(1);
    persist(counters, CounterKind::SyncWarn, next);
    SyncDecision::SkipWarn {
        breach,
        warnings: Some(next),
        last_warning: i64::from(next) == limit,
    }
}

/// Decide whether this run scrubs. `sync_step` is the result of the sync
/// step when one was executed.
pub fn decide_scrub(
    percent: u8,
    sync: &SyncDecision,
    sync_step: Option<&StepResult>,
    delayed_runs: u32,
    counters: &CounterStore,
) -> ScrubDecision {
    if percent == 0 {
        return ScrubDecision::Skip {
            reason: ScrubSkipReason::Disabled,
        };
    }
    if matches!(sync, SyncDecision::SkipWarn { .. }) {
        return ScrubDecision::Skip {
            reason: ScrubSkipReason::ParityOutOfSync,
        };
    }
    if sync.runs_sync() && !sync_step.is_some_and(|s| s.saw_completion_marker) {
        return ScrubDecision::Skip {
            reason: ScrubSkipReason::SyncNotConfirmed,
        };
    }

    let current = counters.read(CounterKind::ScrubDelay);
    if current >= delayed_runs {
        return ScrubDecision::Run;
    }

    let next = current.saturating_add(1);
    persist(counters, CounterKind::ScrubDelay, next);
    ScrubDecision::SkipDelayed {
        deferred: next,
        last_deferred: next == delayed_runs,
    }
}

fn persist(counters: &CounterStore, kind: CounterKind, value: u32) {
    if let Err(err) = counters.write(kind, value) {
        tracing::warn!(counter = %kind, error = %err, "failed to persist counter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidkeeper_core::Job;
    use rstest::rstest;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CounterStore {
        CounterStore::new(dir.path().join("warn"), dir.path().join("delay"))
    }

    fn thresholds(warn: i64) -> ThresholdConfig {
        ThresholdConfig {
            delete_threshold: 10,
            update_threshold: 10,
            sync_warn_threshold: warn,
            scrub_delayed_runs: 0,
        }
    }

    fn changes(removed: u64, updated: u64) -> ChangeSummary {
        ChangeSummary {
            added: 1,
            removed,
            updated,
            ..ChangeSummary::default()
        }
    }

    fn sync_step(marker: bool) -> StepResult {
        StepResult {
            job: Job::Sync,
            completed: true,
            exit_status: Some(0),
            saw_completion_marker: marker,
            output: String::new(),
        }
    }

    #[rstest]
    #[case(10, 0, Breach::Delete)]
    #[case(0, 10, Breach::Update)]
    #[case(11, 12, Breach::Both)]
    fn breach_is_classified(#[case] removed: u64, #[case] updated: u64, #[case] want: Breach) {
        let dir = TempDir::new().unwrap();
        let d = decide_sync(&changes(removed, updated), &thresholds(0), &store(&dir));
        assert_eq!(d, SyncDecision::RunForced { breach: want });
    }

    #[test]
    fn below_thresholds_runs() {
        let dir = TempDir::new().unwrap();
        let d = decide_sync(&changes(9, 9), &thresholds(3), &store(&dir));
        assert_eq!(d, SyncDecision::Run);
        assert!(!store(&dir).exists(CounterKind::SyncWarn));
    }

    #[test]
    fn nothing_changed_skips() {
        let dir = TempDir::new().unwrap();
        let d = decide_sync(&ChangeSummary::default(), &thresholds(0), &store(&dir));
        assert_eq!(d, SyncDecision::Skip);
    }

    #[test]
    fn warning_increments_counter_and_flags_last() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let first = decide_sync(&changes(50, 0), &thresholds(2), &s);
        assert_eq!(
            first,
            SyncDecision::SkipWarn { breach: Breach::Delete, warnings: Some(1), last_warning: false }
        );
        let second = decide_sync(&changes(50, 0), &thresholds(2), &s);
        assert_eq!(
            second,
            SyncDecision::SkipWarn { breach: Breach::Delete, warnings: Some(2), last_warning: true }
        );
        assert_eq!(s.read(CounterKind::SyncWarn), 2);
        let third = decide_sync(&changes(50, 0), &thresholds(2), &s);
        assert_eq!(third, SyncDecision::RunForced { breach: Breach::Delete });
        assert_eq!(s.read(CounterKind::SyncWarn), 2, "decision alone never clears");
    }

    #[test]
    fn negative_warn_threshold_never_touches_counter() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.write(CounterKind::SyncWarn, 7).unwrap();
        let d = decide_sync(&changes(0, 99), &thresholds(-1), &s);
        assert_eq!(
            d,
            SyncDecision::SkipWarn { breach: Breach::Update, warnings: None, last_warning: false }
        );
        assert_eq!(s.read(CounterKind::SyncWarn), 7);
    }

    #[test]
    fn scrub_disabled_wins_over_everything() {
        let dir = TempDir::new().unwrap();
        let d = decide_scrub(0, &SyncDecision::Run, Some(&sync_step(false)), 0, &store(&dir));
        assert_eq!(d, ScrubDecision::Skip { reason: ScrubSkipReason::Disabled });
    }

    #[test]
    fn scrub_skipped_when_parity_out_of_sync() {
        let dir = TempDir::new().unwrap();
        let warn = SyncDecision::SkipWarn { breach: Breach::Both, warnings: None, last_warning: false };
        let d = decide_scrub(5, &warn, None, 0, &store(&dir));
        assert_eq!(d, ScrubDecision::Skip { reason: ScrubSkipReason::ParityOutOfSync });
    }

    #[test]
    fn scrub_skipped_without_sync_marker() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let d = decide_scrub(5, &SyncDecision::Run, Some(&sync_step(false)), 3, &s);
        assert_eq!(d, ScrubDecision::Skip { reason: ScrubSkipReason::SyncNotConfirmed });
        assert!(!s.exists(CounterKind::ScrubDelay));
    }

    #[test]
    fn scrub_runs_after_skip_when_not_delayed() {
        let dir = TempDir::new().unwrap();
        let d = decide_scrub(5, &SyncDecision::Skip, None, 0, &store(&dir));
        assert_eq!(d, ScrubDecision::Run);
    }

    #[test]
    fn scrub_delay_counts_up_to_limit() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let step = sync_step(true);
        assert_eq!(
            decide_scrub(5, &SyncDecision::Run, Some(&step), 2, &s),
            ScrubDecision::SkipDelayed { deferred: 1, last_deferred: false }
        );
        assert_eq!(
            decide_scrub(5, &SyncDecision::Run, Some(&step), 2, &s),
            ScrubDecision::SkipDelayed { deferred: 2, last_deferred: true }
        );
        assert_eq!(decide_scrub(5, &SyncDecision::Run, Some(&step), 2, &s), ScrubDecision::Run);
    }
}
