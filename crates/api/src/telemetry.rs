//! Tracing bootstrap
//!
//! Structured logs go to stdout and to a daily-rolling file in the
//! configured log directory; the `/logs` endpoints read the rolled files
//! back. The returned guard must be held for the life of the process so the
//! non-blocking writer flushes on shutdown.

use std::path::{Path, PathBuf};

use chrono::Utc;
use statbridge_domain::{LoggingConfig, Result, StatBridgeError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name prefix used by the daily appender.
const LOG_FILE_PREFIX: &str = "statbridge.log";

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
///
/// # Errors
///
/// Returns `StatBridgeError::Io` if the log directory cannot be created.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.dir)
        .map_err(|err| StatBridgeError::Io(format!("failed to create log directory: {err}")))?;

    let file_appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

/// Path of the file the daily appender writes today.
///
/// `tracing-appender` rolls on UTC date boundaries and suffixes the prefix
/// with the UTC date.
pub fn current_log_file(dir: &Path) -> PathBuf {
    dir.join(format!("{}.{}", LOG_FILE_PREFIX, Utc::now().format("%Y-%m-%d")))
}
