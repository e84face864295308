//! Interval scheduler for the sync pipeline
//!
//! Fires on a fixed interval independent of run duration. A tick that lands
//! while a run is still in progress resolves to the pipeline's
//! already-running acknowledgment; ticks are never queued. Each run executes
//! on its own spawned task; a panic inside a run is absorbed at the join
//! boundary while the run guard finalizes the statistics.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use statbridge_core::{RunOutcome, SyncPipeline};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Shared slot holding the next scheduled tick time.
type NextRunSlot = Arc<StdMutex<Option<DateTime<Utc>>>>;

/// Configuration for the sync scheduler
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Tick interval
    pub interval: Duration,
    /// Kick off one run immediately on start
    pub run_on_start: bool,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600), // 10 minutes
            run_on_start: true,
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Interval scheduler with explicit lifecycle management.
pub struct SyncScheduler {
    pipeline: Arc<SyncPipeline>,
    config: SyncSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    next_run_at: NextRunSlot,
}

impl SyncScheduler {
    /// Create a new sync scheduler
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Sync pipeline to drive
    /// * `config` - Scheduler configuration
    pub fn new(pipeline: Arc<SyncPipeline>, config: SyncSchedulerConfig) -> Self {
        Self {
            pipeline,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            next_run_at: Arc::new(StdMutex::new(None)),
        }
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that runs the sync job periodically.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(interval_secs = self.config.interval.as_secs(), "Starting sync scheduler");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let pipeline = Arc::clone(&self.pipeline);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();
        let next_run_at = Arc::clone(&self.next_run_at);

        let handle = tokio::spawn(async move {
            Self::run_loop(pipeline, config, cancel, next_run_at).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Sync scheduler started");

        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the background task and awaits completion.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping sync scheduler");

        // Cancel background task
        self.cancellation_token.cancel();

        // Await handle with timeout
        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(error = %err, "Scheduler task failed to join");
                    return Err(SchedulerError::TaskJoinFailed(err.to_string()));
                }
                Err(_) => {
                    warn!("Scheduler task did not complete within timeout");
                    return Err(SchedulerError::Timeout { seconds: join_timeout.as_secs() });
                }
            }
        }

        self.next_run_at.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take();

        info!("Sync scheduler stopped");

        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Time of the next scheduled tick, if the loop is between ticks.
    pub fn next_run_at(&self) -> Option<DateTime<Utc>> {
        *self.next_run_at.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Background tick loop
    async fn run_loop(
        pipeline: Arc<SyncPipeline>,
        config: SyncSchedulerConfig,
        cancel: CancellationToken,
        next_run_at: NextRunSlot,
    ) {
        if config.run_on_start {
            info!("Running initial sync job");
            Self::execute_run(&pipeline).await;
        }

        loop {
            {
                let mut slot =
                    next_run_at.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                *slot = chrono::Duration::from_std(config.interval)
                    .ok()
                    .and_then(|delta| Utc::now().checked_add_signed(delta));
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sync loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.interval) => {
                    Self::execute_run(&pipeline).await;
                }
            }
        }
    }

    /// Run the pipeline on its own task so a panic cannot kill the loop.
    async fn execute_run(pipeline: &Arc<SyncPipeline>) {
        let pipeline = Arc::clone(pipeline);
        let handle = tokio::spawn(async move { pipeline.run_once().await });

        match handle.await {
            Ok(RunOutcome::AlreadyRunning) => {
                debug!("Previous run still in progress; tick skipped");
            }
            Ok(RunOutcome::Completed(status)) => {
                debug!(status = status.as_str(), "Scheduled run finished");
            }
            Err(err) if err.is_panic() => {
                error!("Sync run panicked; statistics were finalized by the run guard");
            }
            Err(err) => {
                error!(error = %err, "Sync run task failed to join");
            }
        }
    }
}

/// Ensure scheduler is stopped when dropped
impl Drop for SyncScheduler {
    fn drop(&mut self) {
        // Note: Can't check task_handle (async), so check if token is not cancelled
        // This is best-effort cleanup in Drop
        if !self.cancellation_token.is_cancelled() {
            warn!("SyncScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
