//! Destroy command.

use std::path::Path;

use dialoguer::Confirm;

use crate::cli::sync::print_report;
use crate::cli::{output, until_interrupted};
use crate::core::reconciler::Reconciler;
use crate::core::state::StateFile;
use crate::core::store::SecretStore;
use crate::core::sync;
use crate::error::{Error, Result};

/// Delete every tracked secret, asking first unless `yes` is set.
pub async fn execute<S: SecretStore>(reconciler: &Reconciler<S>, state_path: &Path, yes: bool) -> Result<()> {
    let mut state = StateFile::load(state_path)?;
    if state.is_empty() {
        output::dimmed("nothing tracked");
        return Ok(());
    }

    if !yes && !confirm(&state.ids())? {
        output::dimmed("aborted");
        return Ok(());
    }

    let report = until_interrupted(sync::destroy(reconciler, &mut state)).await;
    state.save(state_path)?;
    let report = report.ok_or(Error::Interrupted)?;

    print_report("Destroy", &report, false)?;
    if report.failures() == 0 {
        output::success(&format!("{} secret(s) deleted", report.entries.len()));
    }
    report.into_result().map(|_| ())
}

fn confirm(ids: &[String]) -> Result<bool> {
    println!();
    println!("The following secrets will be deleted:");
    for id in ids {
        println!("  {}", output::id(id));
    }
    println!();

    Confirm::new()
        .with_prompt(format!("Delete {} secret(s)?", ids.len()))
        .default(false)
        .interact()
        .map_err(Into::into)
}
