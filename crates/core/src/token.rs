//! Token expiry policy
//!
//! Pure decision over the persisted login timestamp. A missing or malformed
//! timestamp is treated as expired, so the fetcher always re-authenticates
//! rather than sending a stale or absent token.

use chrono::{DateTime, Duration, Utc};

/// Whether a bearer token issued at `issued_at` has outlived `expiry_window`.
///
/// `issued_at` is the RFC 3339 string persisted by the credential store.
/// Returns `true` when it is absent, unparseable, or older than the window.
pub fn is_expired(issued_at: Option<&str>, expiry_window: Duration) -> bool {
    let Some(raw) = issued_at else {
        return true;
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(issued) => Utc::now() - issued.with_timezone(&Utc) > expiry_window,
        Err(_) => true,
    }
}
