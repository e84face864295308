//! Integration tests for the full sync pipeline with network scenarios
//!
//! **Purpose**: exercise the critical path from credential file -> source
//! fetch -> transform -> destination submission -> statistics update
//!
//! **Coverage:**
//! - Happy path: fetch 3 rows, drop the zero-visitor one, publish 2, record
//!   matched/unmatched counts
//! - Fetch failure: source down, destination never contacted, run failed
//! - Destination rejection: success flag false -> warning status
//! - Destination outage: transport-level failure -> failed status
//!
//! **Infrastructure:**
//! - Real credential file (tempdir)
//! - WireMock HTTP server simulating both partner APIs
//! - Pipeline wired exactly as in production

use std::sync::Arc;

use chrono::Utc;
use statbridge_core::{CredentialStore, JobStats, RunOutcome, SyncPipeline};
use statbridge_domain::{Credential, RunStatus, SourceApiConfig};
use statbridge_infra::{Authenticator, DestinationClient, FileCredentialStore, SourceClient};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    pipeline: SyncPipeline,
    stats: Arc<JobStats>,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let source_config = SourceApiConfig {
        auth_url: format!("{}/authenticate", server.uri()),
        stats_url: format!("{}/stats", server.uri()),
        username: "ops@example.com".to_string(),
        password: "secret".to_string(),
        token_expiry_hours: 2,
        page_limit: 1000,
    };

    let store = Arc::new(FileCredentialStore::new(dir.path().join("credentials.json")));
    store
        .store(&Credential {
            token: "tok-live".to_string(),
            issued_at: Some(Utc::now().to_rfc3339()),
            user_email: None,
            user_name: None,
        })
        .await
        .unwrap();

    let authenticator = Authenticator::new(&source_config, store.clone()).unwrap();
    let source =
        SourceClient::new(&source_config, chrono_tz::UTC, store, authenticator).unwrap();
    let destination = DestinationClient::new(&statbridge_domain::DestinationApiConfig {
        url: format!("{}/ingest", server.uri()),
    })
    .unwrap();

    let stats = Arc::new(JobStats::new());
    let pipeline = SyncPipeline::new(
        Arc::new(source),
        Arc::new(destination),
        Arc::clone(&stats),
        chrono_tz::UTC,
    );

    Harness { server, pipeline, stats, _dir: dir }
}

fn stats_body() -> serde_json::Value {
    serde_json::json!({
        "errorCode": "NO_ERROR",
        "data": {
            "count": 3,
            "statistics": [
                {
                    "source": "vr-b-oZaR5m-t-mlYq6o-0213",
                    "visitors": 20,
                    "totalLeads": 9,
                    "soldLeads": 3,
                    "totalRevenue": 10.24,
                    "conversionRate": 45.0,
                    "soldRate": 33.33,
                    "EPL": 1.14
                },
                {"source": "idle-source", "visitors": 0, "totalLeads": 0},
                {"source": "second-live", "visitors": 7, "totalLeads": 2, "EPL": 0.5}
            ]
        }
    })
}

#[tokio::test]
async fn end_to_end_success_filters_and_records_counts() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    // The zero-visitor row must already be gone by the time the batch lands.
    Mock::given(method("PUT"))
        .and(path("/ingest"))
        .and(body_partial_json(serde_json::json!({
            "data": [
                {"campaign_code": "vr-b-oZaR5m-t-mlYq6o-0213", "clicks": 20, "epc": 1.14, "rpc": 1.14},
                {"campaign_code": "second-live", "clicks": 7}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "matched": 2,
            "unmatched": 0,
            "total_received": 2
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.pipeline.run_once().await;
    assert_eq!(outcome, RunOutcome::Completed(RunStatus::Success));

    let snapshot = h.stats.snapshot();
    assert_eq!(snapshot.total_runs, 1);
    assert_eq!(snapshot.successful_runs, 1);
    assert_eq!(snapshot.failed_runs, 0);
    assert_eq!(snapshot.last_matched, 2);
    assert_eq!(snapshot.last_unmatched, 0);
    assert_eq!(snapshot.last_status, Some(RunStatus::Success));
    assert!(!snapshot.is_running);
    assert!(snapshot.last_run.is_some());

    h.server.verify().await;
}

#[tokio::test]
async fn fetch_failure_never_contacts_the_destination() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let outcome = h.pipeline.run_once().await;
    assert_eq!(outcome, RunOutcome::Completed(RunStatus::Failed));

    let snapshot = h.stats.snapshot();
    assert_eq!(snapshot.total_runs, 1);
    assert_eq!(snapshot.failed_runs, 1);
    assert_eq!(snapshot.successful_runs, 0);
    assert_eq!(snapshot.last_status, Some(RunStatus::Failed));

    h.server.verify().await;
}

#[tokio::test]
async fn destination_rejection_records_a_warning() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .mount(&h.server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "report_date is closed"
        })))
        .mount(&h.server)
        .await;

    let outcome = h.pipeline.run_once().await;
    assert_eq!(outcome, RunOutcome::Completed(RunStatus::Warning));

    let snapshot = h.stats.snapshot();
    assert_eq!(snapshot.failed_runs, 1);
    assert_eq!(snapshot.last_status, Some(RunStatus::Warning));
}

#[tokio::test]
async fn destination_outage_records_a_failure() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .mount(&h.server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1) // publish is never retried
        .mount(&h.server)
        .await;

    let outcome = h.pipeline.run_once().await;
    assert_eq!(outcome, RunOutcome::Completed(RunStatus::Failed));
    assert_eq!(h.stats.snapshot().last_status, Some(RunStatus::Failed));

    h.server.verify().await;
}
