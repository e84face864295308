//! Destination batch submission client
//!
//! Implements the `DestinationSink` port: submits one report-date batch and
//! parses the structured match/unmatch outcome. There is no retry anywhere on
//! this path: destination-side idempotency under duplicate submission is
//! unverified, so a failed publish surfaces as a single run failure.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use statbridge_core::DestinationSink;
use statbridge_domain::{
    DestinationApiConfig, DestinationRecord, PublishDetail, PublishError, PublishOutcome,
    StatBridgeError,
};
use tracing::{info, warn};

use crate::http::HttpClient;

/// Client for the destination ingestion endpoint.
pub struct DestinationClient {
    http: HttpClient,
    url: String,
}

impl DestinationClient {
    /// Create a client from the destination API configuration.
    ///
    /// # Errors
    ///
    /// Returns `StatBridgeError::Config` if the HTTP client cannot be built.
    pub fn new(config: &DestinationApiConfig) -> Result<Self, StatBridgeError> {
        // max_attempts(1): a submission must never be silently repeated.
        let http = HttpClient::builder()
            .max_attempts(1)
            .user_agent(concat!("statbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, url: config.url.clone() })
    }
}

#[async_trait]
impl DestinationSink for DestinationClient {
    async fn publish(
        &self,
        report_date: NaiveDate,
        records: &[DestinationRecord],
    ) -> Result<PublishOutcome, PublishError> {
        info!(%report_date, records = records.len(), "submitting batch to destination");

        let payload = SubmissionRequest { report_date, data: records };
        let request = self.http.request(Method::PUT, &self.url).json(&payload);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| PublishError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Unreachable(format!(
                "destination endpoint returned status {status}"
            )));
        }

        let body: SubmissionResponse = response.json().await.map_err(|err| {
            PublishError::Unreachable(format!("failed to parse destination response: {err}"))
        })?;

        if !body.success {
            return Err(PublishError::Rejected(
                body.message.unwrap_or_else(|| "destination reported failure".to_string()),
            ));
        }

        for error in &body.errors {
            warn!(error = %error, "destination reported a record error");
        }

        Ok(PublishOutcome {
            matched: body.matched,
            unmatched: body.unmatched,
            total_received: body.total_received,
            details: body.details,
            errors: body.errors,
            message: body.message,
        })
    }
}

#[derive(Debug, Serialize)]
struct SubmissionRequest<'a> {
    report_date: NaiveDate,
    data: &'a [DestinationRecord],
}

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    matched: i64,
    #[serde(default)]
    unmatched: i64,
    #[serde(default)]
    total_received: i64,
    #[serde(default)]
    details: Vec<PublishDetail>,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}
