//! Domain types shared by the reconciler and its callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// A repository owner (user or organization login).
pub type Owner = String;

/// A repository name without its owner.
pub type RepoName = String;

/// A secret name (e.g., API_KEY).
pub type SecretName = String;

/// An opaque timestamp string exactly as returned by the remote store.
///
/// Only ever compared for equality, never parsed.
pub type Timestamp = String;

/// A declared secret: the desired state for one remote secret.
///
/// The plaintext is zeroed on drop and never shown by `Debug`.
#[derive(Clone)]
pub struct SecretDeclaration {
    /// Target repository as `owner/repo`
    pub repo: String,
    /// Secret name
    pub name: SecretName,
    /// Plaintext value, write-only
    pub value: Zeroizing<String>,
}

impl SecretDeclaration {
    /// Create a declaration.
    pub fn new(repo: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            name: name.into(),
            value: Zeroizing::new(value.into()),
        }
    }
}

impl fmt::Debug for SecretDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDeclaration")
            .field("repo", &self.repo)
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Last-known remote timestamps, persisted alongside a declaration.
///
/// Used purely for drift comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTrackedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}
