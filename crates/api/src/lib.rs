//! # Statbridge API
//!
//! Operational HTTP surface and application wiring.
//!
//! This crate contains:
//! - The axum router backing health/status/logs/trigger supervision
//! - The application context assembling store, clients, pipeline, scheduler
//! - Tracing bootstrap with daily-rolling log files
//!
//! The binary entry point lives in `src/main.rs`.

pub mod context;
pub mod models;
pub mod routes;
pub mod telemetry;

pub use context::AppContext;
pub use routes::router;
