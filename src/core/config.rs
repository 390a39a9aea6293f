//! Settings and declarations.
//!
//! `Settings` is built once at the CLI boundary and handed to the store;
//! the core never re-validates it. Declarations are read from a TOML file
//! (`gh-secrets.toml`):
//!
//! ```toml
//! [[secret]]
//! repo = "acme/widgets"
//! name = "API_KEY"
//! value_env = "API_KEY_VALUE"
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::types::SecretDeclaration;
use crate::error::{ConfigError, Result};

/// Remote API settings.
#[derive(Clone)]
pub struct Settings {
    /// Base URL of the REST API
    pub api_url: Url,
    /// Bearer token; requests are anonymous without one
    pub token: Option<Zeroizing<String>>,
}

impl Settings {
    /// Validate and build settings.
    ///
    /// An empty token is treated as no token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidApiUrl` unless `api_url` is an absolute
    /// http(s) URL.
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        let invalid = |reason: &str| ConfigError::InvalidApiUrl {
            url: api_url.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(api_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https").into());
        }
        if url.cannot_be_a_base() {
            return Err(invalid("not a base URL").into());
        }

        let token = token
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);

        Ok(Self {
            api_url: url,
            token,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct DeclarationsFile {
    #[serde(default, rename = "secret")]
    secrets: Vec<RawDeclaration>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeclaration {
    repo: String,
    name: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    value_env: Option<String>,
}

impl fmt::Debug for RawDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDeclaration")
            .field("repo", &self.repo)
            .field("name", &self.name)
            .field("value_env", &self.value_env)
            .finish()
    }
}

/// Load declarations from a file, resolving `value_env` from the process
/// environment.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file is missing, or any error
/// from [`parse_declarations`].
pub fn load_declarations(path: &Path) -> Result<Vec<SecretDeclaration>> {
    debug!(path = %path.display(), "loading declarations");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_declarations(path, &contents, |var| std::env::var(var).ok())
}

/// Parse declarations from TOML.
///
/// Names and repository paths are not checked here; the reconciler
/// enforces those before any remote call.
///
/// # Errors
///
/// Returns `ConfigError` if the TOML is malformed, a declaration has
/// neither or both of `value`/`value_env`, a referenced variable is unset,
/// or the same repo/name pair appears twice.
pub fn parse_declarations<F>(path: &Path, contents: &str, env: F) -> Result<Vec<SecretDeclaration>>
where
    F: Fn(&str) -> Option<String>,
{
    let file: DeclarationsFile = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut declarations = Vec::with_capacity(file.secrets.len());

    for raw in file.secrets {
        let RawDeclaration {
            repo,
            name,
            value,
            value_env,
        } = raw;
        let invalid = |reason: String| ConfigError::InvalidDeclaration {
            repo: repo.clone(),
            name: name.clone(),
            reason,
        };

        let value = match (value, value_env) {
            (Some(value), None) => Zeroizing::new(value),
            (None, Some(var)) => env(&var)
                .map(Zeroizing::new)
                .ok_or_else(|| invalid(format!("environment variable {} is not set", var)))?,
            (Some(_), Some(_)) => {
                return Err(invalid("set only one of `value` or `value_env`".to_string()).into())
            }
            (None, None) => {
                return Err(invalid("one of `value` or `value_env` is required".to_string()).into())
            }
        };

        if !seen.insert((repo.clone(), name.clone())) {
            return Err(ConfigError::Duplicate { repo, name }.into());
        }

        declarations.push(SecretDeclaration { repo, name, value });
    }

    debug!(count = declarations.len(), "declarations loaded");
    Ok(declarations)
}
