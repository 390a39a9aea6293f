//! Remote secret store.
//!
//! Abstracts the four calls the reconciler needs from a repository secret
//! API, with implementations for the GitHub REST API and an in-process
//! store (tests and the `test-store` feature only).
//!
//! ## Adding a New Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `gitea.rs`)
//! 3. Re-export from this module
//!
//! Implementations must report a missing target as
//! `RemoteError::NotFound` from every operation, including delete. The
//! reconciler alone decides which not-found results become state
//! transitions.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::cipher::{EncryptedSecret, RepositoryPublicKey};
use crate::core::types::{SecretName, Timestamp};
use crate::error::Result;

mod github;
#[cfg(any(test, feature = "test-store"))]
mod memory;

pub use github::GitHubStore;
#[cfg(any(test, feature = "test-store"))]
pub use memory::{Call, MemorySecretStore};

/// Remote operations, used for error context and call recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetPublicKey,
    UpsertSecret,
    GetSecretMetadata,
    DeleteSecret,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::GetPublicKey => "get public key",
            Operation::UpsertSecret => "upsert secret",
            Operation::GetSecretMetadata => "get secret",
            Operation::DeleteSecret => "delete secret",
        })
    }
}

/// Remote-side record of a secret. The value is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretMetadata {
    pub name: SecretName,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Repository-scoped secret store.
///
/// Calls are expected to be already authenticated. No implementation
/// retries; transient failures are returned as they happen.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Current public key of a repository.
    async fn get_public_key(&self, owner: &str, repo: &str) -> Result<RepositoryPublicKey>;

    /// Create the secret if absent, replace it if present.
    async fn upsert_secret(&self, owner: &str, repo: &str, secret: &EncryptedSecret)
        -> Result<()>;

    /// Secret metadata only.
    async fn get_secret_metadata(&self, owner: &str, repo: &str, name: &str)
        -> Result<SecretMetadata>;

    /// Delete a secret.
    async fn delete_secret(&self, owner: &str, repo: &str, name: &str) -> Result<()>;
}

/// Human-readable target used in remote error context.
pub(crate) fn target(owner: &str, repo: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{}/{}/{}", owner, repo, name),
        None => format!("{}/{}", owner, repo),
    }
}
