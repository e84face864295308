//! Source partner API integration
//!
//! Authentication (static credentials -> short-lived bearer token) and the
//! statistics fetch with bounded re-authentication on 401/403.

pub mod auth;
pub mod client;

pub use auth::Authenticator;
pub use client::SourceClient;
