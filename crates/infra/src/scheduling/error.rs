//! Scheduler error types

use thiserror::Error;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// Stop did not complete within the join timeout
    #[error("Scheduler task did not stop within {seconds}s")]
    Timeout { seconds: u64 },

    /// Loop task panicked or was aborted
    #[error("Scheduler task join failed: {0}")]
    TaskJoinFailed(String),
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
