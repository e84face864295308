//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for statbridge
///
/// Covers the ambient concerns (configuration, I/O, transport, internal
/// invariants). Step-specific failures of the sync pipeline use the dedicated
/// [`AuthError`], [`FetchError`] and [`PublishError`] enums below.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StatBridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for statbridge operations
pub type Result<T> = std::result::Result<T, StatBridgeError>;

/// Authentication against the source API
#[derive(Debug, Error)]
pub enum AuthError {
    /// The endpoint answered but reported an application-level error code.
    #[error("Login rejected by source API: {0}")]
    Rejected(String),

    /// Transport failure or non-success HTTP status on the login request.
    #[error("Source API unreachable during login: {0}")]
    Unreachable(String),
}

/// Fetching statistics from the source API
#[derive(Debug, Error)]
pub enum FetchError {
    /// Login failed, or the API kept rejecting the bearer token after the
    /// bounded re-authentication retries were exhausted.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Transport failure or unexpected HTTP status (anything but 401/403).
    #[error("Statistics request failed: {0}")]
    RequestFailed(String),

    /// The API answered 2xx but carried an application-level error code.
    #[error("Source API returned error code: {0}")]
    ApplicationError(String),
}

impl From<AuthError> for FetchError {
    fn from(err: AuthError) -> Self {
        Self::AuthFailed(err.to_string())
    }
}

/// Publishing a batch to the destination API
#[derive(Debug, Error)]
pub enum PublishError {
    /// The destination answered but flagged the submission as unsuccessful.
    #[error("Submission rejected by destination API: {0}")]
    Rejected(String),

    /// Transport failure or non-success HTTP status.
    #[error("Destination API unreachable: {0}")]
    Unreachable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_converts_into_fetch_error() {
        let err: FetchError = AuthError::Rejected("BAD_CREDENTIALS".to_string()).into();
        assert!(matches!(err, FetchError::AuthFailed(_)));
        assert!(err.to_string().contains("BAD_CREDENTIALS"));
    }

    #[test]
    fn umbrella_error_serializes_tagged() {
        let err = StatBridgeError::Config("missing timezone".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing timezone");
    }
}
