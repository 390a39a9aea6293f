//! Persisted state.
//!
//! Maps each resource id (`owner:repo:name`) to the last-known remote
//! timestamps. The plaintext value is never written; a SHA-256
//! fingerprint of it is kept instead so a changed declared value can be
//! detected and replaced.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::types::LocalTrackedState;
use crate::error::{Result, StateError};

/// Tracked state for one managed secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSecret {
    /// Target repository as `owner/repo`
    pub repo: String,
    pub name: String,
    /// Hex SHA-256 of the declared plaintext
    pub value_sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl TrackedSecret {
    pub fn new(repo: &str, name: &str, value_sha256: String, timestamps: LocalTrackedState) -> Self {
        Self {
            repo: repo.to_string(),
            name: name.to_string(),
            value_sha256,
            created_at: timestamps.created_at,
            updated_at: timestamps.updated_at,
        }
    }

    /// Timestamps as the reconciler consumes them.
    pub fn timestamps(&self) -> LocalTrackedState {
        LocalTrackedState {
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    /// Record timestamps produced by a read.
    pub fn record(&mut self, timestamps: LocalTrackedState) {
        self.created_at = timestamps.created_at;
        self.updated_at = timestamps.updated_at;
    }
}

/// The whole state file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub secrets: BTreeMap<String, TrackedSecret>,
}

impl StateFile {
    /// Load state, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no state file, starting empty");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let state: Self = toml::from_str(&contents).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), tracked = state.secrets.len(), "state loaded");
        Ok(state)
    }

    /// Write state through a temporary file and rename it into place.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if serialization or any file operation fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(StateError::Serialize)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);

        let write_err = |source| StateError::Write {
            path: path.to_path_buf(),
            source,
        };
        std::fs::write(&tmp, contents).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)?;

        debug!(path = %path.display(), tracked = self.secrets.len(), "state saved");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TrackedSecret> {
        self.secrets.get(id)
    }

    pub fn insert(&mut self, id: String, tracked: TrackedSecret) {
        self.secrets.insert(id, tracked);
    }

    /// Clear an id, as when remote state confirms absence.
    pub fn forget(&mut self, id: &str) -> Option<TrackedSecret> {
        self.secrets.remove(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.secrets.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

/// Hex SHA-256 of a plaintext value.
pub fn fingerprint(value: &str) -> String {
    Sha256::digest(value.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
