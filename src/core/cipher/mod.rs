//! Envelope sealing.
//!
//! Secrets leave this process only as ciphertext addressed to the target
//! repository's public key. The repository key is fetched fresh for every
//! seal, since the remote side may rotate it at any time. Nothing here can
//! decrypt.
//!
//! ## Flow
//!
//! 1. `fetch_public_key` asks the store for `{key_id, key}`
//! 2. `seal` decodes the key and produces a base64 anonymous sealed box
//! 3. `EncryptedSecret` carries the ciphertext and `key_id` to the store

mod envelope;
mod sealed_box;

use serde::Deserialize;
use tracing::debug;

use crate::core::store::SecretStore;
use crate::error::Result;

pub use envelope::EncryptedSecret;
pub use sealed_box::{decode_public_key, seal};

/// A repository's current public encryption key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryPublicKey {
    /// Remote identifier of the key, echoed back on upsert
    pub key_id: String,
    /// Base64 key material (32 raw bytes once decoded)
    pub key: String,
}

impl RepositoryPublicKey {
    pub fn new(key_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key: key.into(),
        }
    }
}

/// Fetch the current public key of `owner/repo`.
///
/// # Errors
///
/// Returns `RemoteError` on any store failure, including not-found.
pub async fn fetch_public_key<S>(store: &S, owner: &str, repo: &str) -> Result<RepositoryPublicKey>
where
    S: SecretStore + ?Sized,
{
    let key = store.get_public_key(owner, repo).await?;
    debug!(owner, repo, key_id = %key.key_id, "fetched repository public key");
    Ok(key)
}
