//! Context type.
//!
//! A (vault, environment) pair identifying one logical secret scope.
//! Parsed from `"vault:environment"` or a bare `"environment"`, in which
//! case the caller's configured default vault applies.

use crate::error::{Result, ValidationError};

/// One logical secret scope: a vault slug plus an environment name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Context {
    vault: String,
    environment: String,
}

impl Context {
    /// Create a context from explicit parts.
    pub fn new(vault: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            vault: vault.into(),
            environment: environment.into(),
        }
    }

    /// Parse a context string.
    ///
    /// Accepts `"vault:environment"` or a bare `"environment"`; the bare
    /// form resolves the vault to `default_vault`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidContext` for empty parts or more
    /// than one separator.
    pub fn parse(input: &str, default_vault: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            ValidationError::InvalidContext {
                input: input.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if input.trim().is_empty() {
            return Err(invalid("empty context"));
        }

        match input.split(':').collect::<Vec<_>>().as_slice() {
            [environment] => {
                if default_vault.is_empty() {
                    return Err(invalid("no default vault configured"));
                }
                Ok(Self::new(default_vault, environment.trim()))
            }
            [vault, environment] => {
                if vault.trim().is_empty() {
                    return Err(invalid("empty vault"));
                }
                if environment.trim().is_empty() {
                    return Err(invalid("empty environment"));
                }
                Ok(Self::new(vault.trim(), environment.trim()))
            }
            _ => Err(invalid("expected 'vault:environment' or 'environment'")),
        }
    }

    /// Vault slug.
    pub fn vault(&self) -> &str {
        &self.vault
    }

    /// Environment name.
    pub fn environment(&self) -> &str {
        &self.environment
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.vault, self.environment)
    }
}
