//! Resource identifiers.
//!
//! A managed secret is addressed by `owner:repo:name`. Encoding is a plain
//! join; decoding splits into at most three parts so a name that itself
//! contains `:` survives intact in the last segment. Part emptiness is not
//! checked, only the count.

use std::fmt;
use std::str::FromStr;

use crate::core::constants::ID_DELIMITER;
use crate::core::types::{Owner, RepoName, SecretName};
use crate::error::{Error, FormatError, Result};

/// Opaque handle correlating tracked state with one remote secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub owner: Owner,
    pub repo: RepoName,
    pub name: SecretName,
}

impl ResourceId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            name: name.into(),
        }
    }

    /// Join the three parts into the opaque id string.
    pub fn encode(&self) -> String {
        encode(&self.owner, &self.repo, &self.name)
    }

    /// Parse an opaque id string.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::ResourceId` unless splitting on `:` (at most
    /// three parts) yields exactly three parts.
    pub fn decode(id: &str) -> Result<Self> {
        let (owner, repo, name) = decode(id)?;
        Ok(Self { owner, repo, name })
    }

    /// `owner/repo` of the target repository.
    pub fn repo_path(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

/// Format `owner:repo:name`.
pub fn encode(owner: &str, repo: &str, name: &str) -> String {
    format!("{owner}{d}{repo}{d}{name}", d = ID_DELIMITER)
}

/// Split `owner:repo:name` into its parts.
///
/// # Errors
///
/// Returns `FormatError::ResourceId` on fewer than three parts.
pub fn decode(id: &str) -> Result<(Owner, RepoName, SecretName)> {
    let mut parts = id.splitn(3, ID_DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), Some(name)) => {
            Ok((owner.to_string(), repo.to_string(), name.to_string()))
        }
        _ => Err(FormatError::ResourceId { id: id.to_string() }.into()),
    }
}
