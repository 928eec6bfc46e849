//! Domain types shared by every raidkeeper crate.
//!
//! Everything here is plain data: the change counts reported by the
//! comparison step, the threshold knobs, the decisions taken by the policy
//! engine and the outcome of a single run. Behaviour lives in
//! `raidkeeper-engine`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Change summary
// ---------------------------------------------------------------------------

/// Counts extracted from the output of the comparison (`diff`) step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub added: u64,
    pub removed: u64,
    pub updated: u64,
    pub moved: u64,
    pub copied: u64,
}

impl ChangeSummary {
    /// Sum of all five counts. Saturates instead of overflowing.
    pub fn total(&self) -> u64 {
        [self.added, self.removed, self.updated, self.moved, self.copied]
            .iter()
            .fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Safety thresholds consulted before sync and scrub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Removed-file count at or above which sync is considered unsafe.
    #[serde(rename = "delete")]
    pub delete_threshold: u64,
    /// Updated-file count at or above which sync is considered unsafe.
    #[serde(rename = "update")]
    pub update_threshold: u64,
    /// Negative: never force. Zero: always force. N: force after N warnings.
    #[serde(rename = "sync_warn")]
    pub sync_warn_threshold: i64,
    /// Consecutive eligible runs to defer scrub for. Zero scrubs every run.
    pub scrub_delayed_runs: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            delete_threshold: 500,
            update_threshold: 500,
            sync_warn_threshold: -1,
            scrub_delayed_runs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// One array-tool subcommand executed as a step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    Diff,
    Sync,
    Scrub,
    ScrubNew,
    Touch,
    Smart,
    Status,
    Down,
}

impl Job {
    /// Uppercase label used in subjects and log headers.
    pub fn label(&self) -> &'static str {
        match self {
            Job::Diff => "DIFF",
            Job::Sync => "SYNC",
            Job::Scrub => "SCRUB",
            Job::ScrubNew => "SCRUB NEW",
            Job::Touch => "TOUCH",
            Job::Smart => "SMART",
            Job::Status => "STATUS",
            Job::Down => "DOWN",
        }
    }

    /// Array-tool subcommand name.
    pub fn subcommand(&self) -> &'static str {
        match self {
            Job::Diff => "diff",
            Job::Sync => "sync",
            Job::Scrub | Job::ScrubNew => "scrub",
            Job::Touch => "touch",
            Job::Smart => "smart",
            Job::Status => "status",
            Job::Down => "down",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Which thresholds a change summary met or exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breach {
    Delete,
    Update,
    Both,
}

impl Breach {
    /// Classify a pair of breach flags. `None` when neither threshold is met.
    pub fn classify(delete: bool, update: bool) -> Option<Self> {
        match (delete, update) {
            (true, true) => Some(Breach::Both),
            (true, false) => Some(Breach::Delete),
            (false, true) => Some(Breach::Update),
            (false, false) => None,
        }
    }

    pub fn includes_delete(&self) -> bool {
        matches!(self, Breach::Delete | Breach::Both)
    }

    pub fn includes_update(&self) -> bool {
        matches!(self, Breach::Update | Breach::Both)
    }
}

/// Outcome of the sync policy for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SyncDecision {
    /// No changes reported; nothing to sync.
    Skip,
    /// Changes below every threshold.
    Run,
    /// A threshold was breached but the warning budget is exhausted (or zero).
    RunForced { breach: Breach },
    /// A threshold was breached and sync was deferred.
    SkipWarn {
        breach: Breach,
        /// Warning count persisted by this decision, `None` when the
        /// counter is not in use (negative warn threshold).
        warnings: Option<u32>,
        last_warning: bool,
    },
}

impl SyncDecision {
    /// True for the decisions that execute the sync step.
    pub fn runs_sync(&self) -> bool {
        matches!(self, SyncDecision::Run | SyncDecision::RunForced { .. })
    }

    pub fn breach(&self) -> Option<Breach> {
        match self {
            SyncDecision::RunForced { breach } | SyncDecision::SkipWarn { breach, .. } => {
                Some(*breach)
            }
            SyncDecision::Skip | SyncDecision::Run => None,
        }
    }
}

/// Why a scrub was not executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrubSkipReason {
    /// Scrub percentage is zero.
    Disabled,
    /// Sync was deferred by a threshold breach, parity is out of date.
    ParityOutOfSync,
    /// Sync ran but its output carried no completion marker.
    SyncNotConfirmed,
}

impl fmt::Display for ScrubSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrubSkipReason::Disabled => write!(f, "scrub is disabled"),
            ScrubSkipReason::ParityOutOfSync => write!(f, "parity is out of sync"),
            ScrubSkipReason::SyncNotConfirmed => write!(f, "sync did not confirm success"),
        }
    }
}

/// Outcome of the scrub policy for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ScrubDecision {
    Run,
    Skip { reason: ScrubSkipReason },
    SkipDelayed { deferred: u32, last_deferred: bool },
}

impl ScrubDecision {
    pub fn runs_scrub(&self) -> bool {
        matches!(self, ScrubDecision::Run)
    }
}

// ---------------------------------------------------------------------------
// Step results and run outcome
// ---------------------------------------------------------------------------

/// Structured result of one external step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub job: Job,
    /// The process was spawned and exited on its own (not killed, not
    /// failed to start).
    pub completed: bool,
    pub exit_status: Option<i32>,
    /// A configured completion marker appeared in the output.
    pub saw_completion_marker: bool,
    #[serde(skip)]
    pub output: String,
}

impl StepResult {
    /// Sync and scrub succeed only on an affirmative completion marker; the
    /// array tool's exit status does not separate "nothing to do" from
    /// non-fatal failures. `diff` exits 2 when a sync is needed. Other jobs
    /// succeed on a clean exit.
    pub fn succeeded(&self) -> bool {
        match self.job {
            Job::Sync | Job::Scrub | Job::ScrubNew => self.saw_completion_marker,
            Job::Diff => self.completed && matches!(self.exit_status, Some(0) | Some(2)),
            _ => self.completed && self.exit_status == Some(0),
        }
    }

    /// Result for a step whose process could not be started.
    pub fn not_started(job: Job) -> Self {
        Self {
            job,
            completed: false,
            exit_status: None,
            saw_completion_marker: false,
            output: String::new(),
        }
    }
}

/// Everything a single run did. Built by the coordinator, consumed by the
/// report builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub summary: Option<ChangeSummary>,
    pub thresholds: ThresholdConfig,
    pub sync_decision: Option<SyncDecision>,
    pub scrub_decision: Option<ScrubDecision>,
    pub ran_diff: bool,
    pub ran_sync: bool,
    pub sync_succeeded: bool,
    pub ran_scrub: bool,
    pub scrub_succeeded: bool,
    /// Jobs in execution order.
    pub jobs: Vec<Job>,
    pub steps: Vec<StepResult>,
}

impl RunOutcome {
    pub fn new(thresholds: ThresholdConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            summary: None,
            thresholds,
            sync_decision: None,
            scrub_decision: None,
            ran_diff: false,
            ran_sync: false,
            sync_succeeded: false,
            ran_scrub: false,
            scrub_succeeded: false,
            jobs: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Record an executed step and keep the per-job flags in step.
    pub fn record(&mut self, step: StepResult) {
        match step.job {
            Job::Diff => self.ran_diff = true,
            Job::Sync => {
                self.ran_sync = true;
                self.sync_succeeded = step.succeeded();
            }
            Job::Scrub => {
                self.ran_scrub = true;
                self.scrub_succeeded = step.succeeded();
            }
            _ => {}
        }
        self.jobs.push(step.job);
        self.steps.push(step);
    }

    /// "DIFF + SYNC + SCRUB" style label of the executed jobs.
    pub fn jobs_label(&self) -> String {
        self.jobs
            .iter()
            .map(Job::label)
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// Steps that did not complete successfully, in execution order.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| !s.succeeded())
    }

    pub fn step(&self, job: Job) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.job == job)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
