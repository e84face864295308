//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STATBRIDGE_SERVER_HOST` / `STATBRIDGE_SERVER_PORT`: operational surface
//! - `STATBRIDGE_SYNC_INTERVAL_MINUTES`: timer interval
//! - `STATBRIDGE_SYNC_TIMEZONE`: IANA name for the report date
//! - `STATBRIDGE_SYNC_RUN_ON_START`: run once immediately (true/false)
//! - `STATBRIDGE_SOURCE_AUTH_URL` / `STATBRIDGE_SOURCE_STATS_URL`
//! - `STATBRIDGE_SOURCE_USERNAME` / `STATBRIDGE_SOURCE_PASSWORD`
//! - `STATBRIDGE_SOURCE_TOKEN_EXPIRY_HOURS` / `STATBRIDGE_SOURCE_PAGE_LIMIT`
//! - `STATBRIDGE_DESTINATION_URL`
//! - `STATBRIDGE_CREDENTIAL_PATH`
//! - `STATBRIDGE_LOG_DIR` / `STATBRIDGE_LOG_LEVEL`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./statbridge.toml` or `./statbridge.json` (current working directory)
//! 3. Parent directories (up to 2 levels)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use statbridge_domain::{
    Config, DestinationApiConfig, LoggingConfig, Result, ServerConfig, SourceApiConfig,
    StatBridgeError, StorageConfig, SyncConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `StatBridgeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or invalid (e.g. an unknown timezone)
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The partner endpoints and credentials must be present; everything else
/// falls back to its default.
///
/// # Errors
/// Returns `StatBridgeError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let config = Config {
        server: ServerConfig {
            host: env_or("STATBRIDGE_SERVER_HOST", "0.0.0.0"),
            port: env_parse("STATBRIDGE_SERVER_PORT", 8000)?,
        },
        sync: SyncConfig {
            interval_minutes: env_parse("STATBRIDGE_SYNC_INTERVAL_MINUTES", 10)?,
            timezone: env_or("STATBRIDGE_SYNC_TIMEZONE", "UTC"),
            run_on_start: env_bool("STATBRIDGE_SYNC_RUN_ON_START", true),
        },
        source: SourceApiConfig {
            auth_url: env_var("STATBRIDGE_SOURCE_AUTH_URL")?,
            stats_url: env_var("STATBRIDGE_SOURCE_STATS_URL")?,
            username: env_var("STATBRIDGE_SOURCE_USERNAME")?,
            password: env_var("STATBRIDGE_SOURCE_PASSWORD")?,
            token_expiry_hours: env_parse("STATBRIDGE_SOURCE_TOKEN_EXPIRY_HOURS", 2)?,
            page_limit: env_parse("STATBRIDGE_SOURCE_PAGE_LIMIT", 1000)?,
        },
        destination: DestinationApiConfig { url: env_var("STATBRIDGE_DESTINATION_URL")? },
        storage: StorageConfig {
            credential_path: PathBuf::from(env_or(
                "STATBRIDGE_CREDENTIAL_PATH",
                "credentials.json",
            )),
        },
        logging: LoggingConfig {
            dir: PathBuf::from(env_or("STATBRIDGE_LOG_DIR", "logs")),
            level: env_or("STATBRIDGE_LOG_LEVEL", "info"),
        },
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `StatBridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StatBridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StatBridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StatBridgeError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StatBridgeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StatBridgeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(StatBridgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent levels, and the
/// executable's directory for `config.{toml,json}` / `statbridge.{toml,json}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.toml"),
            cwd.join("config.json"),
            cwd.join("statbridge.toml"),
            cwd.join("statbridge.json"),
            cwd.join("../config.toml"),
            cwd.join("../config.json"),
            cwd.join("../../config.toml"),
            cwd.join("../../config.json"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.toml"),
                exe_dir.join("config.json"),
                exe_dir.join("statbridge.toml"),
                exe_dir.join("statbridge.json"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}

/// Parse the configured IANA timezone name.
///
/// # Errors
/// Returns `StatBridgeError::Config` for unknown names.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| StatBridgeError::Config(format!("Unknown timezone: {name}")))
}

/// Cross-field checks shared by both loading paths.
fn validate(config: &Config) -> Result<()> {
    parse_timezone(&config.sync.timezone)?;

    if config.sync.interval_minutes == 0 {
        return Err(StatBridgeError::Config(
            "sync.interval_minutes must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Get required environment variable
///
/// # Errors
/// Returns `StatBridgeError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        StatBridgeError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Environment variable with a default when unset.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a typed value from an environment variable, defaulting when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| StatBridgeError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
