//! # Statbridge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client wrapper with bounded retry
//! - File-backed credential store
//! - Source API integration (authentication + statistics fetch)
//! - Destination API integration (batch submission)
//! - Interval scheduler driving the sync pipeline
//! - Configuration loader (environment and config files)
//!
//! ## Architecture
//! - Implements traits defined in `statbridge-core`
//! - Contains all "impure" code (network, filesystem, timers)

pub mod config;
pub mod credentials;
pub mod destination;
pub mod errors;
pub mod http;
pub mod scheduling;
pub mod source;

// Re-export commonly used items
pub use credentials::FileCredentialStore;
pub use destination::DestinationClient;
pub use http::{HttpClient, HttpClientBuilder};
pub use scheduling::{SyncScheduler, SyncSchedulerConfig};
pub use source::{Authenticator, SourceClient};
