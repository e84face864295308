//! Run statistics types
//!
//! Snapshot structures shared between the sync pipeline (sole writer) and the
//! status surface (reader). The mutable tracker itself lives in
//! `statbridge-core`; these are the plain data shapes it exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Batch published and accepted by the destination.
    Success,
    /// Destination answered but refused the batch.
    Warning,
    /// A pipeline step failed (fetch, empty batch, transport).
    Failed,
    /// Unanticipated failure; the run was finalized by the cleanup guard.
    Error,
}

impl RunStatus {
    /// Whether the run counts toward `successful_runs`.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Stable lowercase label, as reported by the status surface.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

/// Point-in-time copy of the process-lifetime run counters.
///
/// Initialized to zeros at process start, never persisted across restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    /// Wall-clock time the last run reached a terminal state.
    pub last_run: Option<DateTime<Utc>>,
    pub last_status: Option<RunStatus>,
    /// Matched count reported by the destination on the last accepted batch.
    pub last_matched: i64,
    /// Unmatched count reported by the destination on the last accepted batch.
    pub last_unmatched: i64,
    pub is_running: bool,
    pub last_run_id: Option<Uuid>,
}
