//! Anonymous sealed boxes.
//!
//! X25519 with a fresh ephemeral key per call, XSalsa20-Poly1305, the
//! ephemeral public key prefixed to the ciphertext. Compatible with
//! libsodium's `crypto_box_seal`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use tracing::trace;

use super::RepositoryPublicKey;
use crate::core::constants::PUBLIC_KEY_LEN;
use crate::error::{Error, KeyFormatError, Result};

/// Decode base64 key material into an X25519 public key.
///
/// # Errors
///
/// Returns `KeyFormatError` if the material is not base64, decodes to
/// nothing, or is not exactly 32 bytes.
pub fn decode_public_key(material: &str) -> std::result::Result<PublicKey, KeyFormatError> {
    let bytes = STANDARD.decode(material.trim())?;
    if bytes.is_empty() {
        return Err(KeyFormatError::Empty);
    }

    let raw: [u8; PUBLIC_KEY_LEN] =
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyFormatError::InvalidLength {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            })?;

    Ok(PublicKey::from(raw))
}

/// Seal a plaintext to a repository public key.
///
/// Non-deterministic: every call uses a new ephemeral key pair.
///
/// # Returns
///
/// Base64 (standard alphabet, padded) of `ephemeral_pk || ciphertext`.
///
/// # Errors
///
/// Returns `KeyFormatError` for unusable key material.
pub fn seal(plaintext: &str, key: &RepositoryPublicKey) -> Result<String> {
    let public_key = decode_public_key(&key.key)?;

    trace!(
        key_id = %key.key_id,
        plaintext_len = plaintext.len(),
        "sealing secret"
    );

    let sealed = public_key
        .seal(&mut OsRng, plaintext.as_bytes())
        .map_err(|e| Error::Seal(e.to_string()))?;

    let encoded = STANDARD.encode(sealed);
    trace!(ciphertext_len = encoded.len(), "sealed secret");
    Ok(encoded)
}
