//! Secret name policy.
//!
//! Checked before any remote call is attempted.

use std::fmt;

use crate::core::constants::RESERVED_PREFIX;
use crate::error::{Result, ValidationError};

/// A single naming rule a secret name breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameViolation {
    /// Not `^[A-Za-z_][A-Za-z0-9_]*$`
    InvalidFormat,
    /// Starts with `GITHUB_`, case-insensitively
    ReservedPrefix,
}

impl fmt::Display for NameViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameViolation::InvalidFormat => f.write_str(
                "secret names can only contain alphanumeric characters or underscores and must not start with a number",
            ),
            NameViolation::ReservedPrefix => {
                write!(f, "secret names must not start with the {} prefix", RESERVED_PREFIX)
            }
        }
    }
}

/// Validate a secret name against the naming policy.
///
/// Every rule is checked; all violations are returned together. An empty
/// list means the name is acceptable.
///
/// # Arguments
///
/// * `name` - The secret name to validate
pub fn validate_secret_name(name: &str) -> Vec<NameViolation> {
    let mut violations = Vec::new();

    if !matches_name_pattern(name) {
        violations.push(NameViolation::InvalidFormat);
    }

    if name.to_uppercase().starts_with(RESERVED_PREFIX) {
        violations.push(NameViolation::ReservedPrefix);
    }

    violations
}

/// Validate a secret name, failing with every violation found.
///
/// # Errors
///
/// Returns `ValidationError::InvalidName` if any rule is broken.
pub fn ensure_valid_name(name: &str) -> Result<()> {
    let violations = validate_secret_name(name);
    if violations.is_empty() {
        return Ok(());
    }

    Err(ValidationError::InvalidName {
        name: name.to_string(),
        violations,
    }
    .into())
}

fn matches_name_pattern(name: &str) -> bool {
    let mut chars = name.chars();

    // First character: letter or underscore
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
