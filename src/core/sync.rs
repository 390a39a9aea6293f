//! Declarative sync.
//!
//! Walks a set of declarations and the persisted state, asking the
//! reconciler to converge each secret:
//!
//! - declared, untracked: create, then read to record timestamps
//! - declared, tracked: read first; gone or drifted means recreate,
//!   a changed value fingerprint means delete and recreate
//! - tracked, no longer declared: delete
//!
//! One failing secret never stops the others. In plan mode reads still run
//! (they are the only way to see drift) but nothing is written remotely and
//! state is left untouched.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::id::ResourceId;
use crate::core::reconciler::{ReadOutcome, Reconciler};
use crate::core::repo_path::RepoPath;
use crate::core::state::{fingerprint, StateFile, TrackedSecret};
use crate::core::store::SecretStore;
use crate::core::types::{LocalTrackedState, SecretDeclaration};
use crate::core::validation::ensure_valid_name;
use crate::error::{Error, Result};

/// Whether changes are applied or only computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Plan,
    Apply,
}

/// Why a tracked secret has to be recreated or forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Updated outside this system
    Drifted,
    /// Deleted outside this system
    Gone,
    /// The declared value changed
    ValueChanged,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::Drifted => "changed outside gh-secrets",
            Reason::Gone => "deleted outside gh-secrets",
            Reason::ValueChanged => "declared value changed",
        })
    }
}

/// What happens to one secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Change {
    Create,
    Recreate { reason: Reason },
    Unchanged,
    Delete,
    Forget { reason: Reason },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Create => f.write_str("create"),
            Change::Recreate { reason } => write!(f, "recreate ({})", reason),
            Change::Unchanged => f.write_str("unchanged"),
            Change::Delete => f.write_str("delete"),
            Change::Forget { reason } => write!(f, "forget ({})", reason),
        }
    }
}

/// Outcome for one secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEntry {
    /// Resource id, or `repo/name` when the repository path is malformed
    pub id: String,
    #[serde(flatten)]
    pub change: Change,
    /// False in plan mode and on failure
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP status of a failed remote call
    #[serde(skip)]
    pub status: Option<u16>,
}

/// Outcome of a sync, refresh or destroy run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    fn push(&mut self, id: &str, change: Change, applied: bool) {
        self.entries.push(SyncEntry {
            id: id.to_string(),
            change,
            applied,
            error: None,
            status: None,
        });
    }

    fn fail(&mut self, id: &str, change: Change, error: &Error) {
        warn!(id, %change, error = %error, "reconciliation failed");
        self.entries.push(SyncEntry {
            id: id.to_string(),
            change,
            applied: false,
            error: Some(error.to_string()),
            status: match error {
                Error::Remote(remote) => remote.status(),
                _ => None,
            },
        });
    }

    /// Entries that failed.
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    /// Whether any remote call was refused for lack of credentials.
    pub fn unauthorized(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.status, Some(401 | 403)))
    }

    /// Entries that change (or would change) remote state.
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.error.is_none() && !matches!(e.change, Change::Unchanged))
            .count()
    }

    /// Fail when any entry failed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Failed` with the failure count.
    pub fn into_result(self) -> Result<Self> {
        match self.failures() {
            0 => Ok(self),
            n => Err(Error::Failed(n)),
        }
    }
}

/// Converge remote secrets and `state` towards `declarations`.
///
/// `state` is updated in place after every secret, so a run that is
/// interrupted still leaves it describing what was done.
pub async fn sync<S: SecretStore>(
    reconciler: &Reconciler<S>,
    declarations: &[SecretDeclaration],
    state: &mut StateFile,
    mode: Mode,
) -> SyncReport {
    let mut report = SyncReport::default();
    let mut declared = HashSet::new();

    for declaration in declarations {
        let id = match expected_id(declaration) {
            Ok(id) => id.encode(),
            Err(e) => {
                let label = format!("{}/{}", declaration.repo, declaration.name);
                report.fail(&label, Change::Create, &e);
                continue;
            }
        };
        declared.insert(id.clone());

        if let Err(e) = ensure_valid_name(&declaration.name) {
            report.fail(&id, Change::Create, &e);
            continue;
        }

        converge(reconciler, declaration, &id, state, mode, &mut report).await;
    }

    for id in state.ids() {
        if declared.contains(&id) {
            continue;
        }

        if mode == Mode::Plan {
            report.push(&id, Change::Delete, false);
            continue;
        }

        match reconciler.delete(&id).await {
            Ok(()) => {
                state.forget(&id);
                report.push(&id, Change::Delete, true);
            }
            Err(e) => report.fail(&id, Change::Delete, &e),
        }
    }

    report
}

async fn converge<S: SecretStore>(
    reconciler: &Reconciler<S>,
    declaration: &SecretDeclaration,
    id: &str,
    state: &mut StateFile,
    mode: Mode,
    report: &mut SyncReport,
) {
    let value_sha256 = fingerprint(&declaration.value);

    let Some(tracked) = state.get(id).cloned() else {
        debug!(id, "not tracked yet");
        if mode == Mode::Plan {
            report.push(id, Change::Create, false);
            return;
        }
        match create_and_record(reconciler, declaration, value_sha256, state).await {
            Ok(()) => report.push(id, Change::Create, true),
            Err(e) => report.fail(id, Change::Create, &e),
        }
        return;
    };

    let outcome = match reconciler.read(id, &tracked.timestamps()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            report.fail(id, Change::Unchanged, &e);
            return;
        }
    };

    let change = match &outcome {
        ReadOutcome::Gone => Change::Recreate {
            reason: Reason::Gone,
        },
        ReadOutcome::Drifted { .. } => Change::Recreate {
            reason: Reason::Drifted,
        },
        ReadOutcome::InSync(_) if tracked.value_sha256 != value_sha256 => Change::Recreate {
            reason: Reason::ValueChanged,
        },
        ReadOutcome::InSync(_) => Change::Unchanged,
    };

    if mode == Mode::Plan {
        report.push(id, change, false);
        return;
    }

    if outcome.clears_id() {
        state.forget(id);
    }

    let result = match (change, outcome) {
        (Change::Unchanged, ReadOutcome::InSync(timestamps)) => {
            if let Some(entry) = state.secrets.get_mut(id) {
                entry.record(timestamps);
            }
            Ok(())
        }
        (Change::Recreate { reason: Reason::ValueChanged }, _) => {
            // Name and value are immutable: replace means destroy, then create.
            match reconciler.delete(id).await {
                Ok(()) => {
                    state.forget(id);
                    create_and_record(reconciler, declaration, value_sha256, state).await
                }
                Err(e) => Err(e),
            }
        }
        _ => create_and_record(reconciler, declaration, value_sha256, state).await,
    };

    match result {
        Ok(()) => report.push(id, change, true),
        Err(e) => report.fail(id, change, &e),
    }
}

/// Create the secret, then read it back once so its timestamps are on
/// record before anything else can touch it.
///
/// The id is tracked as soon as the upsert succeeds. A failed read leaves it
/// tracked without timestamps, and the next read records them.
async fn create_and_record<S: SecretStore>(
    reconciler: &Reconciler<S>,
    declaration: &SecretDeclaration,
    value_sha256: String,
    state: &mut StateFile,
) -> Result<()> {
    let id = reconciler.create_or_update(declaration).await?.encode();
    state.insert(
        id.clone(),
        TrackedSecret::new(
            &declaration.repo,
            &declaration.name,
            value_sha256,
            LocalTrackedState::default(),
        ),
    );

    match reconciler.read(&id, &LocalTrackedState::default()).await? {
        ReadOutcome::InSync(timestamps) => {
            if let Some(entry) = state.secrets.get_mut(&id) {
                entry.record(timestamps);
            }
        }
        other => {
            // Lost between the upsert and the read; the next run creates it again.
            warn!(%id, ?other, "secret not readable right after create");
            state.forget(&id);
        }
    }
    Ok(())
}

/// Re-read every tracked secret and forget the ones that are gone or
/// drifted, so the next sync recreates them.
pub async fn refresh<S: SecretStore>(reconciler: &Reconciler<S>, state: &mut StateFile) -> SyncReport {
    let mut report = SyncReport::default();

    for id in state.ids() {
        let Some(tracked) = state.get(&id).cloned() else {
            continue;
        };

        match reconciler.read(&id, &tracked.timestamps()).await {
            Ok(ReadOutcome::InSync(timestamps)) => {
                if let Some(entry) = state.secrets.get_mut(&id) {
                    entry.record(timestamps);
                }
                report.push(&id, Change::Unchanged, true);
            }
            Ok(ReadOutcome::Drifted { .. }) => {
                state.forget(&id);
                report.push(&id, Change::Forget { reason: Reason::Drifted }, true);
            }
            Ok(ReadOutcome::Gone) => {
                state.forget(&id);
                report.push(&id, Change::Forget { reason: Reason::Gone }, true);
            }
            Err(e) => report.fail(&id, Change::Unchanged, &e),
        }
    }

    report
}

/// Delete every tracked secret. Ids whose delete fails stay tracked.
pub async fn destroy<S: SecretStore>(reconciler: &Reconciler<S>, state: &mut StateFile) -> SyncReport {
    let mut report = SyncReport::default();

    for id in state.ids() {
        match reconciler.delete(&id).await {
            Ok(()) => {
                state.forget(&id);
                report.push(&id, Change::Delete, true);
            }
            Err(e) => report.fail(&id, Change::Delete, &e),
        }
    }

    report
}

fn expected_id(declaration: &SecretDeclaration) -> Result<ResourceId> {
    let RepoPath { owner, repo } = RepoPath::parse_declared(&declaration.repo)?;
    Ok(ResourceId::new(owner, repo, declaration.name.clone()))
}
