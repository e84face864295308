//! Application context
//!
//! Assembles the credential store, partner API clients, pipeline and
//! scheduler into one shared handle consumed by the HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use statbridge_core::{CredentialStore, JobStats, SyncPipeline};
use statbridge_domain::{Config, Result, StatBridgeError};
use statbridge_infra::config::parse_timezone;
use statbridge_infra::{
    Authenticator, DestinationClient, FileCredentialStore, SourceClient, SyncScheduler,
    SyncSchedulerConfig,
};
use tokio::sync::Mutex;

/// Shared application state.
pub struct AppContext {
    /// Loaded service configuration.
    pub config: Config,
    /// Report-date timezone, parsed once at startup.
    pub timezone: Tz,
    /// Run statistics, written by the pipeline and read by `/status`.
    pub stats: Arc<JobStats>,
    /// The sync pipeline; `/trigger` spawns runs against it.
    pub pipeline: Arc<SyncPipeline>,
    /// Interval scheduler driving the pipeline.
    pub scheduler: Arc<Mutex<SyncScheduler>>,
}

impl AppContext {
    /// Wire the full object graph from configuration.
    ///
    /// The scheduler is created but not started; call
    /// [`AppContext::start_scheduler`] once the process is ready.
    ///
    /// # Errors
    ///
    /// Returns `StatBridgeError::Config` for an invalid timezone or HTTP
    /// client configuration.
    pub fn new(config: Config) -> Result<Self> {
        let timezone = parse_timezone(&config.sync.timezone)?;

        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(&config.storage.credential_path));

        let authenticator = Authenticator::new(&config.source, Arc::clone(&store))?;
        let source = Arc::new(SourceClient::new(
            &config.source,
            timezone,
            Arc::clone(&store),
            authenticator,
        )?);
        let destination = Arc::new(DestinationClient::new(&config.destination)?);

        let stats = Arc::new(JobStats::new());
        let pipeline = Arc::new(SyncPipeline::new(
            source,
            destination,
            Arc::clone(&stats),
            timezone,
        ));

        let scheduler_config = SyncSchedulerConfig {
            interval: Duration::from_secs(config.sync.interval_minutes * 60),
            run_on_start: config.sync.run_on_start,
            ..SyncSchedulerConfig::default()
        };
        let scheduler =
            Arc::new(Mutex::new(SyncScheduler::new(Arc::clone(&pipeline), scheduler_config)));

        Ok(Self { config, timezone, stats, pipeline, scheduler })
    }

    /// Start the interval scheduler.
    pub async fn start_scheduler(&self) -> Result<()> {
        self.scheduler
            .lock()
            .await
            .start()
            .await
            .map_err(|err| StatBridgeError::Internal(err.to_string()))
    }

    /// Stop the interval scheduler gracefully.
    pub async fn stop_scheduler(&self) -> Result<()> {
        self.scheduler
            .lock()
            .await
            .stop()
            .await
            .map_err(|err| StatBridgeError::Internal(err.to_string()))
    }

    /// Whether the scheduler loop task is alive.
    pub async fn scheduler_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Next scheduled tick, if the scheduler is between ticks.
    pub async fn next_run_at(&self) -> Option<DateTime<Utc>> {
        self.scheduler.lock().await.next_run_at()
    }

    /// Path of today's log file.
    ///
    /// The daily appender rolls on UTC date boundaries, so the name is
    /// derived from the UTC date.
    pub fn current_log_file(&self) -> std::path::PathBuf {
        crate::telemetry::current_log_file(&self.config.logging.dir)
    }
}
