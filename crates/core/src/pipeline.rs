//! Sync pipeline
//!
//! Orchestrates one fetch -> filter/transform -> publish cycle and records
//! the outcome in [`JobStats`]. The pipeline is the error boundary: every
//! failure below it becomes a statistics update plus a logged diagnostic,
//! never a process crash. The timer tick and the manual trigger both funnel
//! through [`SyncPipeline::run_once`].

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use statbridge_domain::{PublishError, RunStatus};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ports::{DestinationSink, StatsSource};
use crate::stats::JobStats;
use crate::transform::transform_batch;

/// Result of one trigger attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run held the gate; nothing was started and no counter moved.
    AlreadyRunning,
    /// The run executed and reached this terminal status.
    Completed(RunStatus),
}

/// One-at-a-time synchronization pipeline.
pub struct SyncPipeline {
    source: Arc<dyn StatsSource>,
    destination: Arc<dyn DestinationSink>,
    stats: Arc<JobStats>,
    timezone: Tz,
}

impl SyncPipeline {
    /// Create a pipeline over the given ports.
    ///
    /// `timezone` determines the report date attributed to each batch.
    pub fn new(
        source: Arc<dyn StatsSource>,
        destination: Arc<dyn DestinationSink>,
        stats: Arc<JobStats>,
        timezone: Tz,
    ) -> Self {
        Self { source, destination, stats, timezone }
    }

    /// Handle to the shared statistics, for the status surface.
    pub fn stats(&self) -> Arc<JobStats> {
        Arc::clone(&self.stats)
    }

    /// Execute one complete run, unless one is already in progress.
    ///
    /// Every terminal path releases the run gate and updates the counters;
    /// a panic inside the run is finalized as [`RunStatus::Error`] by the
    /// guard while the surrounding task absorbs the unwind.
    pub async fn run_once(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();

        let Some(guard) = self.stats.begin_run(run_id) else {
            info!(run_id = %run_id, "sync already in progress; trigger ignored");
            return RunOutcome::AlreadyRunning;
        };

        let report_date = Utc::now().with_timezone(&self.timezone).date_naive();
        info!(run_id = %run_id, %report_date, "sync run started");

        let fetched =
            self.source.fetch_statistics(Some(report_date), Some(report_date)).await;
        let records = match fetched {
            Ok(records) => records,
            Err(err) => {
                error!(run_id = %run_id, error = %err, "failed to fetch source statistics");
                guard.complete(RunStatus::Failed);
                return RunOutcome::Completed(RunStatus::Failed);
            }
        };

        let batch = transform_batch(&records);
        info!(
            run_id = %run_id,
            fetched = records.len(),
            kept = batch.len(),
            "transformed statistics batch"
        );

        if batch.is_empty() {
            warn!(run_id = %run_id, "no records with traffic; nothing to publish");
            guard.complete(RunStatus::Failed);
            return RunOutcome::Completed(RunStatus::Failed);
        }

        match self.destination.publish(report_date, &batch).await {
            Ok(outcome) => {
                info!(
                    run_id = %run_id,
                    matched = outcome.matched,
                    unmatched = outcome.unmatched,
                    total_received = outcome.total_received,
                    "batch accepted by destination"
                );
                guard.complete_with_counts(RunStatus::Success, outcome.matched, outcome.unmatched);
                RunOutcome::Completed(RunStatus::Success)
            }
            Err(PublishError::Rejected(message)) => {
                warn!(run_id = %run_id, message = %message, "destination refused the batch");
                guard.complete(RunStatus::Warning);
                RunOutcome::Completed(RunStatus::Warning)
            }
            Err(err @ PublishError::Unreachable(_)) => {
                error!(run_id = %run_id, error = %err, "failed to reach destination");
                guard.complete(RunStatus::Failed);
                RunOutcome::Completed(RunStatus::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use statbridge_domain::{
        DestinationRecord, FetchError, PublishOutcome, SourceStatRecord,
    };

    use super::*;

    fn record(source: &str, visitors: i64) -> SourceStatRecord {
        SourceStatRecord {
            source: source.to_string(),
            visitors,
            total_leads: 4,
            sold_leads: 1,
            total_revenue: 3.5,
            conversion_rate: 20.0,
            sold_rate: 25.0,
            earnings_per_lead: 0.875,
        }
    }

    struct StaticSource {
        records: Vec<SourceStatRecord>,
        fail: bool,
    }

    #[async_trait]
    impl StatsSource for StaticSource {
        async fn fetch_statistics(
            &self,
            _period_from: Option<NaiveDate>,
            _period_to: Option<NaiveDate>,
        ) -> Result<Vec<SourceStatRecord>, FetchError> {
            if self.fail {
                Err(FetchError::RequestFailed("connection reset".to_string()))
            } else {
                Ok(self.records.clone())
            }
        }
    }

    struct RecordingSink {
        calls: AtomicUsize,
        batches: Mutex<Vec<Vec<DestinationRecord>>>,
        response: Result<PublishOutcome, fn() -> PublishError>,
    }

    impl RecordingSink {
        fn accepting(matched: i64, unmatched: i64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                batches: Mutex::new(Vec::new()),
                response: Ok(PublishOutcome {
                    matched,
                    unmatched,
                    total_received: matched + unmatched,
                    ..PublishOutcome::default()
                }),
            }
        }

        fn failing(err: fn() -> PublishError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                batches: Mutex::new(Vec::new()),
                response: Err(err),
            }
        }
    }

    #[async_trait]
    impl DestinationSink for RecordingSink {
        async fn publish(
            &self,
            _report_date: NaiveDate,
            records: &[DestinationRecord],
        ) -> Result<PublishOutcome, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batches.lock().unwrap().push(records.to_vec());
            match &self.response {
                Ok(outcome) => Ok(outcome.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn pipeline(
        source: StaticSource,
        sink: Arc<RecordingSink>,
    ) -> (SyncPipeline, Arc<JobStats>) {
        let stats = Arc::new(JobStats::new());
        let pipeline = SyncPipeline::new(
            Arc::new(source),
            sink,
            Arc::clone(&stats),
            chrono_tz::UTC,
        );
        (pipeline, stats)
    }

    #[tokio::test]
    async fn successful_run_filters_and_publishes() {
        let sink = Arc::new(RecordingSink::accepting(2, 0));
        let source = StaticSource {
            records: vec![record("a", 20), record("b", 0), record("c", 7)],
            fail: false,
        };
        let (pipeline, stats) = pipeline(source, Arc::clone(&sink));

        let outcome = pipeline.run_once().await;
        assert_eq!(outcome, RunOutcome::Completed(RunStatus::Success));

        // The zero-visitor record was dropped before publishing.
        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_runs, 1);
        assert_eq!(snapshot.successful_runs, 1);
        assert_eq!(snapshot.last_matched, 2);
        assert_eq!(snapshot.last_unmatched, 0);
        assert_eq!(snapshot.last_status, Some(RunStatus::Success));
        assert!(!snapshot.is_running);
    }

    #[tokio::test]
    async fn fetch_failure_never_reaches_the_sink() {
        let sink = Arc::new(RecordingSink::accepting(0, 0));
        let source = StaticSource { records: vec![], fail: true };
        let (pipeline, stats) = pipeline(source, Arc::clone(&sink));

        let outcome = pipeline.run_once().await;
        assert_eq!(outcome, RunOutcome::Completed(RunStatus::Failed));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.failed_runs, 1);
        assert_eq!(snapshot.last_status, Some(RunStatus::Failed));
    }

    #[tokio::test]
    async fn empty_filtered_batch_fails_without_publishing() {
        let sink = Arc::new(RecordingSink::accepting(0, 0));
        let source = StaticSource { records: vec![record("idle", 0)], fail: false };
        let (pipeline, stats) = pipeline(source, Arc::clone(&sink));

        let outcome = pipeline.run_once().await;
        assert_eq!(outcome, RunOutcome::Completed(RunStatus::Failed));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
        assert_eq!(stats.snapshot().failed_runs, 1);
    }

    #[tokio::test]
    async fn destination_rejection_is_a_warning() {
        let sink = Arc::new(RecordingSink::failing(|| {
            PublishError::Rejected("unknown report_date".to_string())
        }));
        let source = StaticSource { records: vec![record("a", 3)], fail: false };
        let (pipeline, stats) = pipeline(source, Arc::clone(&sink));

        let outcome = pipeline.run_once().await;
        assert_eq!(outcome, RunOutcome::Completed(RunStatus::Warning));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.failed_runs, 1);
        assert_eq!(snapshot.last_status, Some(RunStatus::Warning));
    }

    #[tokio::test]
    async fn destination_transport_failure_is_failed() {
        let sink = Arc::new(RecordingSink::failing(|| {
            PublishError::Unreachable("connection refused".to_string())
        }));
        let source = StaticSource { records: vec![record("a", 3)], fail: false };
        let (pipeline, stats) = pipeline(source, Arc::clone(&sink));

        let outcome = pipeline.run_once().await;
        assert_eq!(outcome, RunOutcome::Completed(RunStatus::Failed));
        assert_eq!(stats.snapshot().last_status, Some(RunStatus::Failed));
    }

    #[tokio::test]
    async fn concurrent_trigger_is_acknowledged_not_started() {
        let sink = Arc::new(RecordingSink::accepting(1, 0));
        let source = StaticSource { records: vec![record("a", 3)], fail: false };
        let (pipeline, stats) = pipeline(source, sink);

        // Hold the gate the way an in-flight run would.
        let held = stats.begin_run(Uuid::new_v4()).unwrap();

        let outcome = pipeline.run_once().await;
        assert_eq!(outcome, RunOutcome::AlreadyRunning);
        assert_eq!(stats.snapshot().total_runs, 1);

        held.complete(RunStatus::Success);
    }
}
