//! Encrypted secret envelope.
//!
//! Built immediately before submission and dropped right after.

use serde::Serialize;

use super::{seal, RepositoryPublicKey};
use crate::core::types::SecretName;
use crate::error::Result;

/// Ciphertext plus the id of the key it was sealed to.
///
/// Serializes to the upsert request body (`encrypted_value`, `key_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedSecret {
    #[serde(skip_serializing)]
    pub name: SecretName,
    pub key_id: String,
    pub encrypted_value: String,
}

impl EncryptedSecret {
    /// Seal `plaintext` to `key` and wrap it for submission as `name`.
    ///
    /// # Errors
    ///
    /// Returns `KeyFormatError` for unusable key material.
    pub fn seal(name: &str, plaintext: &str, key: &RepositoryPublicKey) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            key_id: key.key_id.clone(),
            encrypted_value: seal(plaintext, key)?,
        })
    }
}
