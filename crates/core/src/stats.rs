//! Run statistics tracking
//!
//! Owns the process-lifetime counters behind a lock so the status surface
//! never observes a half-updated record. The pipeline is the only writer;
//! everything else reads snapshots.
//!
//! `begin_run` doubles as the mutual-exclusion gate: it atomically refuses a
//! second concurrent run without touching `total_runs`. The returned
//! [`RunGuard`] finalizes the counters on every exit path; if it is dropped
//! without an explicit completion (a panic inside the run), the run is
//! recorded with [`RunStatus::Error`].

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use statbridge_domain::{RunSnapshot, RunStatus};
use tracing::warn;
use uuid::Uuid;

/// Shared run statistics, written only by the sync pipeline.
#[derive(Debug, Default)]
pub struct JobStats {
    inner: Mutex<RunSnapshot>,
}

impl JobStats {
    /// Create a tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent point-in-time copy of the counters.
    pub fn snapshot(&self) -> RunSnapshot {
        self.lock().clone()
    }

    /// Whether a run currently holds the gate.
    pub fn is_running(&self) -> bool {
        self.lock().is_running
    }

    /// Claim the run gate.
    ///
    /// Returns `None` when a run is already in progress; in that case no
    /// counter is mutated. Otherwise marks the run as started, increments
    /// `total_runs`, and hands back the guard that must record the terminal
    /// state.
    pub fn begin_run(&self, run_id: Uuid) -> Option<RunGuard<'_>> {
        let mut inner = self.lock();
        if inner.is_running {
            return None;
        }

        inner.is_running = true;
        inner.total_runs += 1;
        inner.last_run_id = Some(run_id);

        Some(RunGuard { stats: self, run_id, completed: false })
    }

    fn lock(&self) -> MutexGuard<'_, RunSnapshot> {
        // A poisoned lock only means a writer panicked mid-update; the
        // counters remain usable and the run guard still finalizes them.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn finish(&self, status: RunStatus, counts: Option<(i64, i64)>) {
        let mut inner = self.lock();
        inner.is_running = false;
        inner.last_run = Some(Utc::now());
        inner.last_status = Some(status);

        if status.is_success() {
            inner.successful_runs += 1;
        } else {
            inner.failed_runs += 1;
        }

        if let Some((matched, unmatched)) = counts {
            inner.last_matched = matched;
            inner.last_unmatched = unmatched;
        }
    }
}

/// Completion guard for one claimed run.
///
/// Dropping the guard without calling a `complete` method records the run as
/// [`RunStatus::Error`]; the unexpected-exception path must still release
/// the gate and update the counters.
#[derive(Debug)]
pub struct RunGuard<'a> {
    stats: &'a JobStats,
    run_id: Uuid,
    completed: bool,
}

impl RunGuard<'_> {
    /// Record the terminal status of this run.
    pub fn complete(mut self, status: RunStatus) {
        self.completed = true;
        self.stats.finish(status, None);
    }

    /// Record the terminal status along with destination match counts.
    pub fn complete_with_counts(mut self, status: RunStatus, matched: i64, unmatched: i64) {
        self.completed = true;
        self.stats.finish(status, Some((matched, unmatched)));
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            warn!(run_id = %self.run_id, "run guard dropped without completion; recording error");
            self.stats.finish(RunStatus::Error, None);
        }
    }
}
