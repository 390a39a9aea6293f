//! In-process secret store.
//!
//! Behaves like the remote API closely enough to drive the reconciler
//! without a network: per-repository key pairs that can be rotated,
//! stale-key rejection on upsert, remote-style timestamps from a logical
//! clock, and hooks to simulate out-of-band updates, deletions and
//! failures. Every call is recorded.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use crypto_box::aead::OsRng;
use crypto_box::SecretKey;

use super::{target, Operation, SecretMetadata, SecretStore};
use crate::core::cipher::{EncryptedSecret, RepositoryPublicKey};
use crate::core::types::Timestamp;
use crate::error::{RemoteError, Result};

/// A recorded call against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    /// `owner/repo` or `owner/repo/name`
    pub target: String,
    /// Ciphertext submitted by an upsert
    pub encrypted_value: Option<String>,
}

struct RepoKeys {
    current: String,
    keys: HashMap<String, SecretKey>,
}

struct Stored {
    key_id: String,
    encrypted_value: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

#[derive(Default)]
struct Inner {
    repos: HashMap<(String, String), RepoKeys>,
    secrets: BTreeMap<(String, String, String), Stored>,
    failures: HashMap<Operation, (u16, String)>,
    calls: Vec<Call>,
    next_key: u64,
    tick: i64,
}

impl Inner {
    fn now(&mut self) -> Timestamp {
        self.tick += 1;
        let epoch = DateTime::<Utc>::from_timestamp(1_767_225_600, 0).unwrap_or_default();
        (epoch + Duration::seconds(self.tick)).to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn generate_key(&mut self) -> (String, SecretKey) {
        self.next_key += 1;
        (format!("{}", 568_250_167_242_549_700 + self.next_key), SecretKey::generate(&mut OsRng))
    }

    fn record(&mut self, operation: Operation, target: String, encrypted_value: Option<String>) {
        self.calls.push(Call {
            operation,
            target,
            encrypted_value,
        });
    }

    fn injected(&mut self, operation: Operation, target: &str) -> Result<()> {
        match self.failures.remove(&operation) {
            Some((404, _)) => Err(RemoteError::NotFound {
                operation,
                target: target.to_string(),
            }
            .into()),
            Some((status, message)) => Err(RemoteError::Status {
                operation,
                target: target.to_string(),
                status,
                message,
            }
            .into()),
            None => Ok(()),
        }
    }
}

/// In-memory [`SecretStore`].
#[derive(Default)]
pub struct MemorySecretStore {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemorySecretStore")
            .field("repos", &inner.repos.len())
            .field("secrets", &inner.secrets.len())
            .finish()
    }
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository with a fresh key pair.
    pub fn with_repository(self, owner: &str, repo: &str) -> Self {
        {
            let mut inner = self.lock();
            let (key_id, key) = inner.generate_key();
            let mut keys = HashMap::new();
            keys.insert(key_id.clone(), key);
            inner.repos.insert(
                (owner.to_string(), repo.to_string()),
                RepoKeys {
                    current: key_id,
                    keys,
                },
            );
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the repository key. Returns the new key id.
    pub fn rotate_key(&self, owner: &str, repo: &str) -> Option<String> {
        let mut inner = self.lock();
        let (key_id, key) = inner.generate_key();
        let keys = inner.repos.get_mut(&(owner.to_string(), repo.to_string()))?;
        keys.keys.insert(key_id.clone(), key);
        keys.current = key_id.clone();
        Some(key_id)
    }

    /// Decrypt a stored secret with the repository key it was sealed to.
    pub fn open(&self, owner: &str, repo: &str, name: &str) -> Option<String> {
        let inner = self.lock();
        let stored = inner
            .secrets
            .get(&(owner.to_string(), repo.to_string(), name.to_string()))?;
        let key = inner
            .repos
            .get(&(owner.to_string(), repo.to_string()))?
            .keys
            .get(&stored.key_id)?;
        let sealed = STANDARD.decode(&stored.encrypted_value).ok()?;
        let plaintext = key.unseal(&sealed).ok()?;
        String::from_utf8(plaintext).ok()
    }

    /// Whether a secret currently exists.
    pub fn contains(&self, owner: &str, repo: &str, name: &str) -> bool {
        self.lock()
            .secrets
            .contains_key(&(owner.to_string(), repo.to_string(), name.to_string()))
    }

    /// Simulate an update made outside this system.
    pub fn touch(&self, owner: &str, repo: &str, name: &str) -> bool {
        let mut inner = self.lock();
        let now = inner.now();
        match inner
            .secrets
            .get_mut(&(owner.to_string(), repo.to_string(), name.to_string()))
        {
            Some(stored) => {
                stored.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Simulate a deletion made outside this system.
    pub fn remove(&self, owner: &str, repo: &str, name: &str) -> bool {
        self.lock()
            .secrets
            .remove(&(owner.to_string(), repo.to_string(), name.to_string()))
            .is_some()
    }

    /// Fail the next call of `operation` with an HTTP status.
    ///
    /// 404 produces `RemoteError::NotFound`; anything else a status error.
    pub fn fail_next(&self, operation: Operation, status: u16, message: &str) {
        self.lock()
            .failures
            .insert(operation, (status, message.to_string()));
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Calls of one operation.
    pub fn calls_of(&self, operation: Operation) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_public_key(&self, owner: &str, repo: &str) -> Result<RepositoryPublicKey> {
        let operation = Operation::GetPublicKey;
        let target = target(owner, repo, None);
        let mut inner = self.lock();
        inner.record(operation, target.clone(), None);
        inner.injected(operation, &target)?;

        let keys = inner
            .repos
            .get(&(owner.to_string(), repo.to_string()))
            .ok_or_else(|| RemoteError::NotFound {
                operation,
                target: target.clone(),
            })?;
        let public = keys
            .keys
            .get(&keys.current)
            .map(|k| STANDARD.encode(k.public_key().as_bytes()))
            .unwrap_or_default();

        Ok(RepositoryPublicKey::new(keys.current.clone(), public))
    }

    async fn upsert_secret(
        &self,
        owner: &str,
        repo: &str,
        secret: &EncryptedSecret,
    ) -> Result<()> {
        let operation = Operation::UpsertSecret;
        let target = target(owner, repo, Some(&secret.name));
        let mut inner = self.lock();
        inner.record(operation, target.clone(), Some(secret.encrypted_value.clone()));
        inner.injected(operation, &target)?;

        let current = match inner.repos.get(&(owner.to_string(), repo.to_string())) {
            Some(keys) => keys.current.clone(),
            None => {
                return Err(RemoteError::NotFound { operation, target }.into());
            }
        };
        if current != secret.key_id {
            return Err(RemoteError::Status {
                operation,
                target,
                status: 422,
                message: format!("key_id {} does not match the current key", secret.key_id),
            }
            .into());
        }

        let now = inner.now();
        let key = (owner.to_string(), repo.to_string(), secret.name.clone());
        let stored = inner.secrets.entry(key).or_insert_with(|| Stored {
            key_id: String::new(),
            encrypted_value: String::new(),
            created_at: now.clone(),
            updated_at: now.clone(),
        });
        stored.key_id = secret.key_id.clone();
        stored.encrypted_value = secret.encrypted_value.clone();
        stored.updated_at = now;
        Ok(())
    }

    async fn get_secret_metadata(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<SecretMetadata> {
        let operation = Operation::GetSecretMetadata;
        let target = target(owner, repo, Some(name));
        let mut inner = self.lock();
        inner.record(operation, target.clone(), None);
        inner.injected(operation, &target)?;

        inner
            .secrets
            .get(&(owner.to_string(), repo.to_string(), name.to_string()))
            .map(|s| SecretMetadata {
                name: name.to_string(),
                created_at: s.created_at.clone(),
                updated_at: s.updated_at.clone(),
            })
            .ok_or_else(|| RemoteError::NotFound { operation, target }.into())
    }

    async fn delete_secret(&self, owner: &str, repo: &str, name: &str) -> Result<()> {
        let operation = Operation::DeleteSecret;
        let target = target(owner, repo, Some(name));
        let mut inner = self.lock();
        inner.record(operation, target.clone(), None);
        inner.injected(operation, &target)?;

        inner
            .secrets
            .remove(&(owner.to_string(), repo.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| RemoteError::NotFound { operation, target }.into())
    }
}
