//! Record types flowing through the sync pipeline
//!
//! `SourceStatRecord` and `DestinationRecord` mirror the two partner wire
//! formats; `Credential` mirrors the persisted session-token file.

use serde::{Deserialize, Serialize};

/// Session credential for the source API.
///
/// The serde names match the on-disk JSON layout of the credential file
/// (`token`, `last_login_time`, `user_email`, `user_name`), which is the sole
/// source of truth across process restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token. Non-empty only after a successful authentication.
    #[serde(default)]
    pub token: String,

    /// RFC 3339 timestamp of the login that produced the token.
    #[serde(default, rename = "last_login_time")]
    pub issued_at: Option<String>,

    /// Email reported by the authentication endpoint.
    #[serde(default)]
    pub user_email: Option<String>,

    /// Display name reported by the authentication endpoint.
    #[serde(default)]
    pub user_name: Option<String>,
}

/// One campaign-source row as returned by the source statistics endpoint.
///
/// Every numeric field defaults to zero so a sparse row never fails to
/// deserialize; the transformer is total over the result. The earnings per
/// lead figure travels under the wire key `EPL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatRecord {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub visitors: i64,
    #[serde(default)]
    pub total_leads: i64,
    #[serde(default)]
    pub sold_leads: i64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub sold_rate: f64,
    #[serde(default, rename = "EPL")]
    pub earnings_per_lead: f64,
}

/// One reshaped row in the destination ingestion schema.
///
/// All monetary and percentage fields are rounded to two decimal places by
/// the transformer before a record is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRecord {
    pub campaign_code: String,
    pub clicks: i64,
    pub leads: i64,
    pub lead_percent: f64,
    pub sales: i64,
    pub sale_percent: f64,
    pub revenue: f64,
    pub epc: f64,
    pub rpc: f64,
}

/// Parsed result of a successful destination submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// Records the destination matched to known campaigns.
    pub matched: i64,
    /// Records the destination could not match.
    pub unmatched: i64,
    /// Total records the destination acknowledged receiving.
    pub total_received: i64,
    /// Per-record match details, when the destination supplies them.
    #[serde(default)]
    pub details: Vec<PublishDetail>,
    /// Destination-reported errors, when any.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Free-form destination message.
    #[serde(default)]
    pub message: Option<String>,
}

/// One matched-record detail line from the destination response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishDetail {
    /// Destination-side campaign code.
    #[serde(rename = "le_code")]
    pub code: String,
    #[serde(default)]
    pub domain: Option<String>,
    /// Partner campaign identifier on the destination side.
    #[serde(default, rename = "pp_campaign")]
    pub campaign: Option<String>,
    #[serde(default)]
    pub sends: i64,
    #[serde(default)]
    pub revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_record_defaults_missing_numeric_fields() {
        let record: SourceStatRecord =
            serde_json::from_str(r#"{"source": "vr-b-oZaR5m"}"#).unwrap();

        assert_eq!(record.source, "vr-b-oZaR5m");
        assert_eq!(record.visitors, 0);
        assert_eq!(record.earnings_per_lead, 0.0);
    }

    #[test]
    fn source_record_reads_epl_wire_key() {
        let record: SourceStatRecord =
            serde_json::from_str(r#"{"source": "s", "EPL": 1.14}"#).unwrap();

        assert_eq!(record.earnings_per_lead, 1.14);
    }

    #[test]
    fn credential_tolerates_sparse_document() {
        let credential: Credential = serde_json::from_str("{}").unwrap();

        assert!(credential.token.is_empty());
        assert!(credential.issued_at.is_none());
    }

    #[test]
    fn publish_detail_maps_wire_keys() {
        let detail: PublishDetail = serde_json::from_str(
            r#"{"le_code": "LE-42", "pp_campaign": "camp-7", "sends": 3, "revenue": 9.5}"#,
        )
        .unwrap();

        assert_eq!(detail.code, "LE-42");
        assert_eq!(detail.campaign.as_deref(), Some("camp-7"));
    }
}
