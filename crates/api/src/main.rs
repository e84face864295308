//! Statbridge - scheduled partner-statistics synchronization service
//!
//! Main entry point: configuration, logging, scheduler lifecycle and the
//! operational HTTP surface.

use std::sync::Arc;

use statbridge_api::{router, telemetry, AppContext};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env before reading configuration.
    let dotenv_result = dotenvy::dotenv();

    let config = statbridge_infra::config::load()?;

    // Logging writes into the configured directory, so it comes after config.
    let _log_guard = telemetry::init(&config.logging)?;

    match dotenv_result {
        Ok(path) => info!(path = %path.display(), "loaded .env file"),
        Err(_) => info!("no .env file found; using process environment"),
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        interval_minutes = config.sync.interval_minutes,
        timezone = %config.sync.timezone,
        "statbridge starting"
    );

    let ctx = Arc::new(AppContext::new(config.clone())?);

    ctx.start_scheduler().await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "operational surface listening");

    axum::serve(listener, router(Arc::clone(&ctx)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(err) = ctx.stop_scheduler().await {
        warn!(error = %err, "scheduler did not stop cleanly");
    }

    info!("statbridge stopped");
    Ok(())
}

/// Resolve when the process receives ctrl-c.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
