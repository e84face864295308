//! Source-to-destination record transformation
//!
//! Maps one source statistics row into the destination ingestion schema.
//! The mapping is total: missing numeric fields have already been defaulted
//! to zero during deserialization, so `transform` never fails.

use statbridge_domain::{DestinationRecord, SourceStatRecord};

/// Round to two decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map one source row into a destination record.
///
/// Visitors become clicks, leads and sales carry over, percentages and
/// monetary figures are rounded to two decimals. `rpc` is defined as equal to
/// `epc` (earnings per lead) in this system.
pub fn transform(record: &SourceStatRecord) -> DestinationRecord {
    let epc = round2(record.earnings_per_lead);

    DestinationRecord {
        campaign_code: record.source.clone(),
        clicks: record.visitors,
        leads: record.total_leads,
        lead_percent: round2(record.conversion_rate),
        sales: record.sold_leads,
        sale_percent: round2(record.sold_rate),
        revenue: round2(record.total_revenue),
        epc,
        rpc: epc,
    }
}

/// Whether a source row carries publishable traffic.
///
/// Zero-visitor rows are dropped before transformation; the destination has
/// nothing to match them against.
pub fn has_traffic(record: &SourceStatRecord) -> bool {
    record.visitors > 0
}

/// Filter and transform a fetched batch.
pub fn transform_batch(records: &[SourceStatRecord]) -> Vec<DestinationRecord> {
    records.iter().filter(|record| has_traffic(record)).map(transform).collect()
}
