//! Refresh command.
//!
//! Re-reads every tracked secret. Drifted or deleted secrets are dropped
//! from state so the next apply recreates them.

use std::path::Path;

use crate::cli::sync::print_report;
use crate::cli::{output, until_interrupted};
use crate::core::reconciler::Reconciler;
use crate::core::state::StateFile;
use crate::core::store::SecretStore;
use crate::core::sync;
use crate::error::{Error, Result};

/// Refresh tracked state from the remote store.
pub async fn execute<S: SecretStore>(reconciler: &Reconciler<S>, state_path: &Path, json: bool) -> Result<()> {
    let mut state = StateFile::load(state_path)?;
    if state.is_empty() && !json {
        output::dimmed("nothing tracked");
        return Ok(());
    }

    let report = until_interrupted(sync::refresh(reconciler, &mut state)).await;
    state.save(state_path)?;
    let report = report.ok_or(Error::Interrupted)?;

    print_report("Refresh", &report, json)?;
    report.into_result().map(|_| ())
}
