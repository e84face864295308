//! Source statistics client
//!
//! Implements the `StatsSource` port: loads the persisted bearer token,
//! re-authenticates when the token policy says it has expired, and fetches
//! the statistics page. A 401/403 answer invalidates the credential and
//! retries the whole fetch through an explicit loop with a hard cap, so a
//! misbehaving partner API can never trap the pipeline in a login/fetch
//! cycle.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use statbridge_core::{token, CredentialStore, StatsSource};
use statbridge_domain::{FetchError, SourceApiConfig, SourceStatRecord, StatBridgeError};
use tracing::{info, warn};

use super::auth::{Authenticator, NO_ERROR};
use crate::http::HttpClient;

/// Re-authentication attempts allowed beyond the first fetch.
const MAX_AUTH_RETRIES: usize = 2;

/// Authenticated client for the source statistics endpoint.
pub struct SourceClient {
    http: HttpClient,
    stats_url: String,
    page_limit: u32,
    token_expiry: Duration,
    timezone: Tz,
    store: Arc<dyn CredentialStore>,
    authenticator: Authenticator,
}

impl SourceClient {
    /// Create a client from the source API configuration.
    ///
    /// # Errors
    ///
    /// Returns `StatBridgeError::Config` if the HTTP client cannot be built.
    pub fn new(
        config: &SourceApiConfig,
        timezone: Tz,
        store: Arc<dyn CredentialStore>,
        authenticator: Authenticator,
    ) -> Result<Self, StatBridgeError> {
        let http = HttpClient::builder()
            .user_agent(concat!("statbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            stats_url: config.stats_url.clone(),
            page_limit: config.page_limit,
            token_expiry: Duration::hours(config.token_expiry_hours as i64),
            timezone,
            store,
            authenticator,
        })
    }

    /// Current date in the configured timezone.
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Bearer token for the next request, refreshing through login when the
    /// persisted one is absent or past its expiry window.
    async fn current_token(&self) -> Result<String, FetchError> {
        if let Some(credential) = self.store.load().await.ok().flatten() {
            if !token::is_expired(credential.issued_at.as_deref(), self.token_expiry) {
                return Ok(credential.token);
            }
            info!("persisted token expired; re-authenticating");
        } else {
            info!("no persisted token; authenticating");
        }

        let credential = self.authenticator.login().await?;
        Ok(credential.token)
    }

    /// Invalidate the persisted credential and acquire a fresh token.
    async fn reauthenticate(&self) -> Result<String, FetchError> {
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "failed to clear rejected credential");
        }
        let credential = self.authenticator.login().await?;
        Ok(credential.token)
    }
}

#[async_trait]
impl StatsSource for SourceClient {
    async fn fetch_statistics(
        &self,
        period_from: Option<NaiveDate>,
        period_to: Option<NaiveDate>,
    ) -> Result<Vec<SourceStatRecord>, FetchError> {
        let period_from = period_from.unwrap_or_else(|| self.today());
        let period_to = period_to.unwrap_or_else(|| self.today());

        info!(%period_from, %period_to, "fetching source statistics");

        let mut bearer = self.current_token().await?;
        let mut reauth_attempts = 0usize;

        loop {
            let payload = StatsRequest {
                limit: self.page_limit,
                offset: 0,
                order_by: "source",
                order_direction: "DESC",
                period_from,
                period_to,
            };

            let request = self
                .http
                .request(Method::POST, &self.stats_url)
                .header("authorization", format!("bearer {bearer}"))
                .json(&payload);

            let response = self
                .http
                .send(request)
                .await
                .map_err(|err| FetchError::RequestFailed(err.to_string()))?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                if reauth_attempts >= MAX_AUTH_RETRIES {
                    return Err(FetchError::AuthFailed(format!(
                        "source API kept returning {status} after {MAX_AUTH_RETRIES} \
                         re-authentication attempts"
                    )));
                }

                reauth_attempts += 1;
                warn!(%status, attempt = reauth_attempts, "token rejected; re-authenticating");
                bearer = self.reauthenticate().await?;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::RequestFailed(format!(
                    "statistics endpoint returned status {status}"
                )));
            }

            let body: StatsResponse = response.json().await.map_err(|err| {
                FetchError::RequestFailed(format!("failed to parse statistics response: {err}"))
            })?;

            if let Some(code) = body.error_code {
                if code != NO_ERROR {
                    return Err(FetchError::ApplicationError(code));
                }
            }

            let data = body.data.unwrap_or_default();
            info!(count = data.count, returned = data.statistics.len(), "fetched statistics page");

            return Ok(data.statistics);
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsRequest {
    limit: u32,
    offset: u32,
    order_by: &'static str,
    order_direction: &'static str,
    period_from: NaiveDate,
    period_to: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    data: Option<StatsData>,
}

#[derive(Debug, Default, Deserialize)]
struct StatsData {
    #[serde(default)]
    count: i64,
    #[serde(default)]
    statistics: Vec<SourceStatRecord>,
}
