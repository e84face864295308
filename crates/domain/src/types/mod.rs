//! Common data types used throughout the application

pub mod records;
pub mod stats;

pub use records::{
    Credential, DestinationRecord, PublishDetail, PublishOutcome, SourceStatRecord,
};
pub use stats::{RunSnapshot, RunStatus};
