//! Destination partner API integration

pub mod client;

pub use client::DestinationClient;
