//! Configuration structures
//!
//! Plain serde shapes consumed by the loader in `statbridge-infra`. One
//! externally supplied configuration set drives the whole service; no
//! credentials or partner endpoints are baked into source.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operational HTTP surface binding.
    #[serde(default)]
    pub server: ServerConfig,
    /// Scheduled sync behavior.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Source partner API (statistics provider).
    pub source: SourceApiConfig,
    /// Destination partner API (batch ingestion).
    pub destination: DestinationApiConfig,
    /// Local persistence.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bind address for the operational HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Timer and report-date settings for the sync job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed tick interval, independent of run duration.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// IANA timezone name used to derive the report date (e.g.
    /// "Asia/Kolkata").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Kick off one run immediately when the scheduler starts.
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            timezone: default_timezone(),
            run_on_start: true,
        }
    }
}

/// Source partner endpoints and static login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceApiConfig {
    /// Authentication endpoint (username/password -> bearer token).
    pub auth_url: String,
    /// Statistics endpoint.
    pub stats_url: String,
    pub username: String,
    pub password: String,
    /// Bearer tokens older than this are re-acquired before fetching.
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: u64,
    /// Maximum records requested per fetch.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

/// Destination partner ingestion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationApiConfig {
    pub url: String,
}

/// Local file persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted session-credential file.
    #[serde(default = "default_credential_path")]
    pub credential_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { credential_path: default_credential_path() }
    }
}

/// Log directory and level filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: default_log_dir(), level: default_log_level() }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_interval_minutes() -> u64 {
    10
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_true() -> bool {
    true
}

fn default_token_expiry_hours() -> u64 {
    2
}

fn default_page_limit() -> u32 {
    1000
}

fn default_credential_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}
