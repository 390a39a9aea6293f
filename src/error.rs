//! Error types.
//!
//! One top-level [`Error`] wraps a focused enum per concern. Local input
//! problems (`Format`, `Validation`, `Config`) are never retryable; remote
//! failures carry the operation and target so they can be diagnosed
//! without logs.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::store::Operation;
use crate::core::validation::NameViolation;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    KeyFormat(#[from] KeyFormatError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("sealing failed: {0}")]
    Seal(String),

    #[error("{0} resource(s) failed")]
    Failed(usize),

    #[error("interrupted")]
    Interrupted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Dialog(#[from] dialoguer::Error),
}

impl Error {
    /// True when the remote store reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Remote(RemoteError::NotFound { .. }))
    }
}

/// Malformed repository paths and resource identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad repo name format: {path}. Should be `owner/name`")]
    RepoPath { path: String },

    #[error("repo name cannot contain `{delimiter}`: {path}")]
    RepoPathDelimiter { path: String, delimiter: char },

    #[error("unexpected ID format ({id:?}). Expected owner:repository:secret_name")]
    ResourceId { id: String },
}

/// Secret name fails the naming policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid secret name '{name}': {}", join_violations(.violations))]
    InvalidName {
        name: String,
        violations: Vec<NameViolation>,
    },
}

fn join_violations(violations: &[NameViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Repository public key material cannot be used for sealing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyFormatError {
    #[error("public key is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("could not convert public key to bytes: decoded to zero bytes")]
    Empty,

    #[error("public key must decode to {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Failures reported by the remote secret store.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("{operation} {target}: not found")]
    NotFound { operation: Operation, target: String },

    #[error("{operation} {target}: HTTP {status}: {message}")]
    Status {
        operation: Operation,
        target: String,
        status: u16,
        message: String,
    },

    #[error("{operation} {target}: {source}")]
    Transport {
        operation: Operation,
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} {target}: invalid response: {reason}")]
    InvalidResponse {
        operation: Operation,
        target: String,
        reason: String,
    },
}

impl RemoteError {
    /// Operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            RemoteError::NotFound { operation, .. }
            | RemoteError::Status { operation, .. }
            | RemoteError::Transport { operation, .. }
            | RemoteError::InvalidResponse { operation, .. } => *operation,
        }
    }

    /// HTTP status, when the store answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::NotFound { .. } => Some(404),
            RemoteError::Status { status, .. } => Some(*status),
            RemoteError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            RemoteError::InvalidResponse { .. } => None,
        }
    }
}

/// Settings and declaration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("declarations file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("secret {repo}/{name}: {reason}")]
    InvalidDeclaration {
        repo: String,
        name: String,
        reason: String,
    },

    #[error("secret {repo}/{name} is declared more than once")]
    Duplicate { repo: String, name: String },
}

/// Persisted state file errors.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("failed to read state {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write state {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
