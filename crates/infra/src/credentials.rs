//! File-backed credential store
//!
//! Persists the session credential as one small JSON document, the sole
//! source of truth across process restarts. Reads are deliberately tolerant:
//! an absent file, invalid JSON, or an empty token all resolve to "no valid
//! credential" and force re-authentication rather than failing the run.
//! Writes go through a sibling temp file and an atomic rename so a reader
//! can never observe a torn document.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use statbridge_core::CredentialStore;
use statbridge_domain::{Credential, Result, StatBridgeError};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// JSON-file implementation of the [`CredentialStore`] port.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "credential file unreadable; treating as empty"
                );
                return Ok(None);
            }
        };

        match serde_json::from_str::<Credential>(&contents) {
            Ok(credential) if !credential.token.is_empty() => Ok(Some(credential)),
            Ok(_) => Ok(None),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "credential file contains invalid JSON; treating as empty"
                );
                Ok(None)
            }
        }
    }

    async fn store(&self, credential: &Credential) -> Result<()> {
        let json = serde_json::to_string_pretty(credential).map_err(|err| {
            StatBridgeError::Internal(format!("failed to serialize credential: {err}"))
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
            }
        }

        // Write-then-rename keeps concurrent readers off half-written content.
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json).await.map_err(InfraError::from)?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(InfraError::from)?;

        debug!(path = %self.path.display(), "credential persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}
