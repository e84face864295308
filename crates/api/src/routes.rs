//! Operational HTTP surface
//!
//! Thin supervision endpoints over the pipeline and scheduler: health,
//! status, log retrieval, and the manual trigger. Handlers never block on a
//! running sync: runs execute on spawned tasks and statistics reads take
//! the lock only briefly.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::context::AppContext;
use crate::models::{
    HealthResponse, JobStatistics, LastExecution, LogsResponse, SchedulerInfo, ServiceInfo,
    StatusResponse, TriggerResponse,
};

/// Default number of log lines returned by `/logs`.
const DEFAULT_LOG_LINES: usize = 50;

/// Build the operational router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/logs", get(logs))
        .route("/logs/download", get(download_logs))
        .route("/trigger", post(trigger))
        .with_state(ctx)
}

/// Root endpoint with service information.
async fn root() -> Json<ServiceInfo> {
    let endpoints: BTreeMap<String, String> = [
        ("health", "/health"),
        ("status", "/status"),
        ("logs", "/logs"),
        ("trigger", "/trigger"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect();

    Json(ServiceInfo {
        service: "Statbridge Data Sync Service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        endpoints,
    })
}

/// Health check, derived from the scheduler task being alive.
async fn health(State(ctx): State<Arc<AppContext>>) -> Response {
    let scheduler_running = ctx.scheduler_running().await;
    let status_code =
        if scheduler_running { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let body = HealthResponse {
        status: if scheduler_running { "healthy" } else { "unhealthy" }.to_string(),
        scheduler_running,
        timestamp: chrono::Utc::now().with_timezone(&ctx.timezone).to_rfc3339(),
    };

    (status_code, Json(body)).into_response()
}

/// Scheduler state and run statistics.
async fn status(State(ctx): State<Arc<AppContext>>) -> Json<StatusResponse> {
    let snapshot = ctx.stats.snapshot();

    let success_rate = if snapshot.total_runs > 0 {
        format!(
            "{:.2}%",
            snapshot.successful_runs as f64 / snapshot.total_runs as f64 * 100.0
        )
    } else {
        "N/A".to_string()
    };

    let next_run = ctx
        .next_run_at()
        .await
        .map(|at| at.with_timezone(&ctx.timezone).format("%Y-%m-%d %H:%M:%S %Z").to_string());

    Json(StatusResponse {
        scheduler: SchedulerInfo { running: ctx.scheduler_running().await, next_run },
        job_statistics: JobStatistics {
            total_runs: snapshot.total_runs,
            successful_runs: snapshot.successful_runs,
            failed_runs: snapshot.failed_runs,
            success_rate,
        },
        last_execution: LastExecution {
            timestamp: snapshot
                .last_run
                .map(|at| at.with_timezone(&ctx.timezone).format("%Y-%m-%d %H:%M:%S %Z").to_string()),
            status: snapshot.last_status,
            matched_records: snapshot.last_matched,
            unmatched_records: snapshot.last_unmatched,
            currently_running: snapshot.is_running,
        },
    })
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    lines: Option<usize>,
}

/// Tail of today's log file.
async fn logs(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let requested = query.lines.unwrap_or(DEFAULT_LOG_LINES);
    let log_file = ctx.current_log_file();

    let contents = match tokio::fs::read_to_string(&log_file).await {
        Ok(contents) => contents,
        Err(_) => {
            let body = LogsResponse {
                log_file: None,
                total_lines: 0,
                showing: 0,
                logs: Vec::new(),
                message: Some("No logs found for today".to_string()),
            };
            return Json(body).into_response();
        }
    };

    let all_lines: Vec<&str> = contents.lines().collect();
    let start = all_lines.len().saturating_sub(requested);
    let recent: Vec<String> = all_lines[start..].iter().map(|line| line.to_string()).collect();

    let body = LogsResponse {
        log_file: Some(log_file.display().to_string()),
        total_lines: all_lines.len(),
        showing: recent.len(),
        logs: recent,
        message: None,
    };
    Json(body).into_response()
}

/// Download today's log file.
async fn download_logs(State(ctx): State<Arc<AppContext>>) -> Response {
    let log_file = ctx.current_log_file();

    match tokio::fs::read(&log_file).await {
        Ok(bytes) => {
            let file_name = log_file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "statbridge.log".to_string());

            (
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file_name}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            error!(path = %log_file.display(), error = %err, "log file not available");
            (StatusCode::NOT_FOUND, "Log file not found").into_response()
        }
    }
}

/// Manually trigger the sync job.
///
/// Returns immediately; the run executes on its own task. A trigger while a
/// run is in progress is acknowledged without touching the statistics.
async fn trigger(State(ctx): State<Arc<AppContext>>) -> Json<TriggerResponse> {
    if ctx.stats.is_running() {
        return Json(TriggerResponse {
            status: "already_running".to_string(),
            message: "Sync job is currently running. Please wait for it to complete.".to_string(),
        });
    }

    info!("manual sync trigger received");

    let pipeline = Arc::clone(&ctx.pipeline);
    tokio::spawn(async move {
        // The pipeline re-checks the run gate; a racing tick resolves to a
        // no-op here.
        pipeline.run_once().await;
    });

    Json(TriggerResponse {
        status: "triggered".to_string(),
        message: "Sync job has been triggered and will run in the background".to_string(),
    })
}
