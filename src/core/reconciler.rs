//! Secret lifecycle reconciliation.
//!
//! Maps a declared `(repo, name, value)` onto remote create/update, read
//! and delete calls. The remote store never returns values, so drift is
//! detected from the opaque `updated_at` timestamp alone:
//!
//! ```text
//!            create_or_update
//!   Absent ───────────────────▶ InSync ◀──┐ read: updated_at unchanged
//!                                 │  └────┘      (or first read)
//!                read: 404        │ read: updated_at changed
//!            ┌────────────────────┴─────────────┐
//!            ▼                                  ▼
//!          Gone                              Drifted
//!   (id cleared, recreate)           (id cleared, recreate)
//! ```
//!
//! Every operation is a short sequence of at most two remote calls with no
//! retries. Dropping the returned future cancels the in-flight call.

use tracing::{debug, info, warn};

use crate::core::cipher::{self, EncryptedSecret};
use crate::core::id::ResourceId;
use crate::core::repo_path::RepoPath;
use crate::core::store::SecretStore;
use crate::core::types::{LocalTrackedState, SecretDeclaration, Timestamp};
use crate::core::validation::ensure_valid_name;
use crate::error::Result;

/// Result of reading a managed secret back from the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Present and assumed in sync; carries the timestamps to persist.
    InSync(LocalTrackedState),
    /// Updated outside this system. The held value can no longer be
    /// trusted, so the id must be cleared and the secret recreated.
    Drifted {
        recorded: Timestamp,
        remote: Timestamp,
    },
    /// Deleted outside this system. The id must be cleared.
    Gone,
}

impl ReadOutcome {
    /// Whether the caller must clear its stored identifier.
    pub fn clears_id(&self) -> bool {
        !matches!(self, ReadOutcome::InSync(_))
    }
}

/// Drives one secret at a time against a [`SecretStore`].
#[derive(Debug)]
pub struct Reconciler<S> {
    store: S,
}

impl<S: SecretStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the secret if absent, replace it if present.
    ///
    /// Safe to retry; also used for in-place value rotation. The plaintext
    /// is sealed to a freshly fetched repository key and dropped.
    ///
    /// # Returns
    ///
    /// The resource id (`owner:repo:name`) for later reads and deletes.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` for a malformed repository path,
    /// `ValidationError` for a bad name (before any remote call),
    /// `KeyFormatError` for unusable key material, and `RemoteError` for any
    /// store failure.
    pub async fn create_or_update(&self, declaration: &SecretDeclaration) -> Result<ResourceId> {
        let RepoPath { owner, repo } = RepoPath::parse(&declaration.repo)?;
        ensure_valid_name(&declaration.name)?;

        let key = cipher::fetch_public_key(&self.store, &owner, &repo).await?;
        let envelope = EncryptedSecret::seal(&declaration.name, &declaration.value, &key)?;

        self.store.upsert_secret(&owner, &repo, &envelope).await?;

        let id = ResourceId::new(owner, repo, declaration.name.clone());
        info!(%id, key_id = %envelope.key_id, "secret created or updated");
        Ok(id)
    }

    /// Read a secret's metadata and compare it with tracked state.
    ///
    /// The first read after creation (no recorded `updated_at`, or an empty
    /// one) adopts the remote timestamps without a drift check. Later reads
    /// flag any `updated_at` change as drift, even if the remote value
    /// happens to equal the declared one.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` for a malformed id and `RemoteError` for any
    /// store failure other than not-found, which becomes
    /// [`ReadOutcome::Gone`].
    pub async fn read(&self, id: &str, tracked: &LocalTrackedState) -> Result<ReadOutcome> {
        let ResourceId { owner, repo, name } = ResourceId::decode(id)?;

        let metadata = match self.store.get_secret_metadata(&owner, &repo, &name).await {
            Ok(metadata) => metadata,
            Err(e) if e.is_not_found() => {
                warn!(
                    id,
                    "removing secret from state because it no longer exists remotely"
                );
                return Ok(ReadOutcome::Gone);
            }
            Err(e) => return Err(e),
        };

        // An empty recorded value counts as never read.
        match tracked.updated_at.as_deref().filter(|s| !s.is_empty()) {
            Some(recorded) if recorded != metadata.updated_at => {
                warn!(
                    id,
                    recorded,
                    remote = %metadata.updated_at,
                    "secret has been updated externally"
                );
                Ok(ReadOutcome::Drifted {
                    recorded: recorded.to_string(),
                    remote: metadata.updated_at,
                })
            }
            Some(recorded) => {
                debug!(id, "secret in sync");
                Ok(ReadOutcome::InSync(LocalTrackedState {
                    created_at: Some(metadata.created_at),
                    updated_at: Some(recorded.to_string()),
                }))
            }
            None => {
                debug!(id, updated_at = %metadata.updated_at, "recording initial timestamps");
                Ok(ReadOutcome::InSync(LocalTrackedState {
                    created_at: Some(metadata.created_at),
                    updated_at: Some(metadata.updated_at),
                }))
            }
        }
    }

    /// Delete a secret.
    ///
    /// Not-found is surfaced as an error rather than treated as success, so
    /// a double delete is visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` for a malformed id and `RemoteError` for any
    /// store failure, including not-found.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let ResourceId { owner, repo, name } = ResourceId::decode(id)?;

        debug!(id, "deleting secret");
        self.store.delete_secret(&owner, &repo, &name).await?;
        info!(id, "secret deleted");
        Ok(())
    }
}
