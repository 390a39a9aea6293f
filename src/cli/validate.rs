//! Validate command.
//!
//! Checks every declaration offline and reports all problems at once.

use std::path::Path;

use crate::cli::output;
use crate::core::config::load_declarations;
use crate::core::repo_path::RepoPath;
use crate::core::validation::validate_secret_name;
use crate::error::{Error, Result};

/// Validate the declarations in `file`.
pub fn execute(file: &Path) -> Result<()> {
    let declarations = load_declarations(file)?;
    let mut problems = 0;

    for declaration in &declarations {
        let label = format!("{}/{}", declaration.repo, declaration.name);

        if let Err(e) = RepoPath::parse_declared(&declaration.repo) {
            output::error(&format!("{}: {}", label, e));
            problems += 1;
        }
        for violation in validate_secret_name(&declaration.name) {
            output::error(&format!("{}: {}", label, violation));
            problems += 1;
        }
    }

    if problems > 0 {
        return Err(Error::Failed(problems));
    }

    output::success(&format!(
        "{} declaration(s) valid in {}",
        declarations.len(),
        output::path(file)
    ));
    Ok(())
}
