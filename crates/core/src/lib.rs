//! # Statbridge Core
//!
//! Pure business logic for the scheduled synchronization pipeline.
//!
//! This crate contains:
//! - Token expiry policy (pure decision over persisted login time)
//! - Record transformation and batch filtering
//! - Run statistics tracking with guaranteed-cleanup run guards
//! - Port traits implemented by `statbridge-infra`
//! - The sync pipeline orchestrating one fetch -> transform -> publish run
//!
//! ## Architecture
//! - Depends on `statbridge-domain` only
//! - No I/O; all impure concerns are reached through the port traits

pub mod pipeline;
pub mod ports;
pub mod stats;
pub mod token;
pub mod transform;

// Re-export commonly used items
pub use pipeline::{RunOutcome, SyncPipeline};
pub use ports::{CredentialStore, DestinationSink, StatsSource};
pub use stats::{JobStats, RunGuard};
