//! Input validation for crossvault operations.
//!
//! Validates secret key names supplied by users.

use crate::error::{Result, ValidationError};

/// Validate a secret key name.
///
/// Secret keys must be valid environment variable names:
/// - Only A-Z, a-z, 0-9, and underscore
/// - Cannot start with a digit
/// - Cannot be empty
///
/// # Errors
///
/// Returns `ValidationError` if the key is invalid.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey.into());
    }

    if let Some(first_char) = key.chars().next() {
        if first_char.is_ascii_digit() {
            return Err(ValidationError::InvalidKey {
                key: key.to_string(),
                reason: "cannot start with a digit".to_string(),
            }
            .into());
        }
    }

    for (i, ch) in key.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(ValidationError::InvalidKey {
                key: key.to_string(),
                reason: format!(
                    "invalid character '{}' at position {}. Only A-Z, 0-9, and underscore are allowed",
                    ch,
                    i + 1
                ),
            }
            .into());
        }
    }

    Ok(())
}

/// Whether a name has the shape of an environment variable.
///
/// Non-failing variant used by the template parser to decide whether a
/// line is an assignment at all.
pub fn is_key_name(name: &str) -> bool {
    validate_key(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(validate_key("DATABASE_URL").is_ok());
        assert!(validate_key("API_KEY").is_ok());
        assert!(validate_key("SECRET_123").is_ok());
        assert!(validate_key("_PRIVATE").is_ok());
        assert!(validate_key("A").is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("123_KEY").is_err());
        assert!(validate_key("API-KEY").is_err());
        assert!(validate_key("API.KEY").is_err());
        assert!(validate_key("API KEY").is_err());
        assert!(validate_key("API@KEY").is_err());
    }

    #[test]
    fn test_is_key_name() {
        assert!(is_key_name("DB_URL"));
        assert!(!is_key_name("not a key"));
    }
}
