//! Port interfaces for sync operations
//!
//! Implemented by `statbridge-infra`; the pipeline and tests depend only on
//! these traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use statbridge_domain::{
    Credential, DestinationRecord, FetchError, PublishError, PublishOutcome, Result,
    SourceStatRecord,
};

/// Persisted session-credential access.
///
/// Exactly one credential exists at a time; `store` fully overwrites it.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the persisted credential.
    ///
    /// An absent or unreadable document is `Ok(None)`; a half-written or
    /// corrupt file must force re-authentication, not an error.
    async fn load(&self) -> Result<Option<Credential>>;

    /// Overwrite the persisted credential.
    async fn store(&self, credential: &Credential) -> Result<()>;

    /// Drop the persisted credential entirely.
    async fn clear(&self) -> Result<()>;
}

/// Authenticated statistics fetch from the source API.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch statistics for the given date range.
    ///
    /// Each omitted endpoint independently defaults to the current date in
    /// the implementation's configured timezone.
    async fn fetch_statistics(
        &self,
        period_from: Option<NaiveDate>,
        period_to: Option<NaiveDate>,
    ) -> std::result::Result<Vec<SourceStatRecord>, FetchError>;
}

/// Batched submission to the destination API.
#[async_trait]
pub trait DestinationSink: Send + Sync {
    /// Submit one report-date batch and parse the structured outcome.
    async fn publish(
        &self,
        report_date: NaiveDate,
        records: &[DestinationRecord],
    ) -> std::result::Result<PublishOutcome, PublishError>;
}
