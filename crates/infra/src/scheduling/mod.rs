//! Scheduling infrastructure for the periodic sync job
//!
//! One interval scheduler drives the pipeline:
//! - Explicit lifecycle management (start/stop)
//! - Join handle tracked for the spawned loop task
//! - Cancellation token support
//! - Each run spawned as its own task so a panicking run cannot kill the loop

pub mod error;
pub mod sync_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sync_scheduler::{SyncScheduler, SyncSchedulerConfig};
