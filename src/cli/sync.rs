//! Plan and apply commands.

use std::path::Path;

use crate::cli::{output, until_interrupted};
use crate::core::config::load_declarations;
use crate::core::reconciler::Reconciler;
use crate::core::state::StateFile;
use crate::core::store::SecretStore;
use crate::core::sync::{self, Change, Mode, SyncReport};
use crate::error::{Error, Result};

/// Converge (or preview converging) the declarations in `file`.
///
/// In apply mode the state file is saved even when interrupted.
pub async fn execute<S: SecretStore>(
    reconciler: &Reconciler<S>,
    file: &Path,
    state_path: &Path,
    mode: Mode,
    json: bool,
) -> Result<()> {
    let declarations = load_declarations(file)?;
    let mut state = StateFile::load(state_path)?;

    let report = until_interrupted(sync::sync(reconciler, &declarations, &mut state, mode)).await;

    if mode == Mode::Apply {
        state.save(state_path)?;
    }
    let report = report.ok_or(Error::Interrupted)?;

    let title = match mode {
        Mode::Plan => "Plan",
        Mode::Apply => "Apply",
    };
    print_report(title, &report, json)?;

    if !json && report.failures() == 0 {
        match (mode, report.pending()) {
            (_, 0) => output::success("secrets match declarations"),
            (Mode::Plan, n) => output::hint(&format!("{} change(s) pending, run: gh-secrets apply", n)),
            (Mode::Apply, n) => output::success(&format!("{} change(s) applied", n)),
        }
    }

    report.into_result().map(|_| ())
}

/// Print a report as a change list or as JSON.
pub(crate) fn print_report(title: &str, report: &SyncReport, json: bool) -> Result<()> {
    if json {
        let result = serde_json::json!({
            "entries": report.entries,
            "pending": report.pending(),
            "failures": report.failures(),
        });
        output::data(&serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if report.entries.is_empty() {
        output::dimmed("no secrets declared or tracked");
        return Ok(());
    }

    output::section(title);
    for entry in &report.entries {
        let marker = match entry.change {
            Change::Create => '+',
            Change::Recreate { .. } => '~',
            Change::Delete | Change::Forget { .. } => '-',
            Change::Unchanged => '=',
        };
        let line = format!("{}  {}", output::id(&entry.id), entry.change);
        output::change(marker, &line);
        if let Some(error) = &entry.error {
            output::error(&format!("{}: {}", entry.id, error));
        }
    }
    println!();

    if report.unauthorized() {
        output::hint("set GITHUB_TOKEN or pass --token");
    }
    Ok(())
}
