//! Input validation raised before any network call.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Organization names: 2-63 chars, lowercase alphanumeric or hyphen,
/// starting with a letter, not ending in a hyphen.
static ORGANIZATION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[a-z][a-z0-9-]{0,61}[a-z0-9]$").expect("organization name pattern is valid")
});

/// Validation failure for caller-supplied parameters.
///
/// Never retried; the request is rejected before any network traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Organization name does not match the required pattern.
    #[error(
        "Invalid organization name '{0}': must be 2-63 lowercase alphanumeric or hyphen \
         characters, starting with a letter and not ending in a hyphen"
    )]
    OrganizationName(String),

    /// A filename was empty or could not be derived from a path.
    #[error("Filename must not be empty")]
    EmptyFilename,

    /// A numeric parameter fell below its minimum.
    #[error("Invalid {field}: must be at least {min}, got {value}")]
    BelowMinimum {
        /// Parameter name
        field: &'static str,
        /// Smallest allowed value
        min: u64,
        /// Value the caller supplied
        value: u64,
    },
}

/// Validates an organization name.
///
/// # Errors
///
/// Returns [`ValidationError::OrganizationName`] if the name does not match
/// `^[a-z][a-z0-9-]{0,61}[a-z0-9]$`.
pub fn organization_name(name: &str) -> Result<(), ValidationError> {
    if ORGANIZATION_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::OrganizationName(name.to_owned()))
    }
}

/// Validates a storage object filename.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyFilename`] if the name is empty.
pub fn filename(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        Err(ValidationError::EmptyFilename)
    } else {
        Ok(())
    }
}

/// Validates a numeric parameter against a minimum.
///
/// # Errors
///
/// Returns [`ValidationError::BelowMinimum`] if `value < min`.
pub fn minimum(field: &'static str, value: u64, min: u64) -> Result<(), ValidationError> {
    if value < min {
        Err(ValidationError::BelowMinimum { field, min, value })
    } else {
        Ok(())
    }
}
