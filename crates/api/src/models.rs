//! Response models for the operational HTTP surface

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statbridge_domain::RunStatus;

/// Service information returned by the root endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub endpoints: BTreeMap<String, String>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub scheduler_running: bool,
    pub timestamp: String,
}

/// Scheduler status information.
#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulerInfo {
    pub running: bool,
    pub next_run: Option<String>,
}

/// Aggregate run counters.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatistics {
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    pub success_rate: String,
}

/// Details of the most recent run.
#[derive(Debug, Serialize, Deserialize)]
pub struct LastExecution {
    pub timestamp: Option<String>,
    pub status: Option<RunStatus>,
    pub matched_records: i64,
    pub unmatched_records: i64,
    pub currently_running: bool,
}

/// Complete status response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub scheduler: SchedulerInfo,
    pub job_statistics: JobStatistics,
    pub last_execution: LastExecution,
}

/// Log tail response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub log_file: Option<String>,
    pub total_lines: usize,
    pub showing: usize,
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Manual trigger acknowledgment.
#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub status: String,
    pub message: String,
}
