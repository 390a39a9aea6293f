//! Constants used throughout gh-secrets.
//!
//! Centralizes magic strings and configuration values.

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version header value.
pub const API_VERSION: &str = "2022-11-28";

/// Media type requested from the REST API.
pub const API_ACCEPT: &str = "application/vnd.github+json";

/// Declarations file name (gh-secrets.toml).
pub const DECLARATIONS_FILE: &str = "gh-secrets.toml";

/// Persisted state file name (.gh-secrets.state.toml).
pub const STATE_FILE: &str = ".gh-secrets.state.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GH_SECRETS_LOG";

/// Delimiter between the parts of a resource identifier.
pub const ID_DELIMITER: char = ':';

/// Delimiter between owner and repository in a repository path.
pub const REPO_PATH_DELIMITER: char = '/';

/// Prefix reserved by GitHub for its own secrets (compared uppercased).
pub const RESERVED_PREFIX: &str = "GITHUB_";

/// Raw length of a repository public key.
pub const PUBLIC_KEY_LEN: usize = 32;
