//! `owner/repo` parsing.

use std::fmt;

use crate::core::constants::{ID_DELIMITER, REPO_PATH_DELIMITER};
use crate::core::types::{Owner, RepoName};
use crate::error::{FormatError, Result};

/// A repository addressed by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoPath {
    pub owner: Owner,
    pub repo: RepoName,
}

impl RepoPath {
    /// Split `owner/repo` into its two components.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::RepoPath` unless the input has exactly two
    /// non-empty segments.
    pub fn parse(path: &str) -> Result<Self> {
        let mut parts = path.split(REPO_PATH_DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(FormatError::RepoPath {
                path: path.to_string(),
            }
            .into()),
        }
    }

    /// Parse the repository of a declaration.
    ///
    /// Like [`RepoPath::parse`], but also rejects the resource id delimiter
    /// in either segment, since such an id would not decode back to the
    /// same repository.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::RepoPath` or `FormatError::RepoPathDelimiter`.
    pub fn parse_declared(path: &str) -> Result<Self> {
        let parsed = Self::parse(path)?;
        if parsed.owner.contains(ID_DELIMITER) || parsed.repo.contains(ID_DELIMITER) {
            return Err(FormatError::RepoPathDelimiter {
                path: path.to_string(),
                delimiter: ID_DELIMITER,
            }
            .into());
        }
        Ok(parsed)
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.owner, REPO_PATH_DELIMITER, self.repo)
    }
}

/// Split `owner/repo` into `(owner, repo)`.
///
/// # Errors
///
/// Returns `FormatError::RepoPath` on malformed input.
pub fn parse_repo_path(path: &str) -> Result<(Owner, RepoName)> {
    let parsed = RepoPath::parse(path)?;
    Ok((parsed.owner, parsed.repo))
}
