//! Error types for crossvault operations.
//!
//! The taxonomy separates caller mistakes (`ValidationError`), absent
//! entities (`NotFoundError`), refused overwrites (`ConflictError`), missing
//! driver capabilities (`UnsupportedError`), and wrapped backend failures
//! (`BackendError`). Bulk operations record per-unit errors instead of
//! aborting; see `core::diff` and `core::copy`.

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("toml serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short stable name for the error's taxonomy bucket.
    ///
    /// Used as the per-unit status in bulk-operation reports and JSON
    /// output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not-found",
            Error::Conflict(_) => "conflict",
            Error::Unsupported(_) => "unsupported",
            Error::Backend(_) => "backend",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::TomlParse(_) | Error::TomlSerialize(_) => "toml",
            Error::Json(_) => "json",
        }
    }
}

/// Bad combination of caller inputs, caught before any backend call.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("source and destination are the same context: {0}")]
    SameContext(String),

    #[error("a literal key and --only/--except patterns are mutually exclusive")]
    KeyAndPattern,

    #[error("nothing to copy: supply a key or --only/--except patterns")]
    NoKeyOrPattern,

    #[error("no contexts available")]
    NoContexts,

    #[error("invalid context '{input}': {reason}")]
    InvalidContext { input: String, reason: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("secret key cannot be empty")]
    EmptyKey,

    #[error("invalid secret key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

/// A secret, vault, environment, or driver type that does not exist.
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("secret not found: {key} in {context}")]
    Secret { key: String, context: String },

    #[error("unknown vault: {0}")]
    Vault(String),

    #[error("unknown environment: {0}")]
    Environment(String),

    #[error("unknown driver type: {0}")]
    Driver(String),

    #[error("template not found: {0}")]
    Template(String),

    #[error("unresolved placeholders: {}", .0.join(", "))]
    Placeholders(Vec<String>),
}

/// Destination already populated and no overwrite was permitted.
#[derive(Error, Debug)]
pub enum ConflictError {
    #[error("secret already exists: {key} in {context} (use --overwrite)")]
    SecretExists { key: String, context: String },

    #[error("output file already exists: {0} (use --overwrite or --append)")]
    OutputExists(String),
}

/// A driver lacks a requested capability.
///
/// Callers are expected to check `VaultDriver::capabilities` before invoking
/// optional operations; this error is the contract's backstop.
#[derive(Error, Debug)]
#[error("vault '{vault}' does not support {operation}")]
pub struct UnsupportedError {
    pub vault: String,
    pub operation: &'static str,
}

/// Wraps any underlying transport, auth, or storage failure.
///
/// Drivers must never let backend-specific error types cross the
/// `VaultDriver` boundary; they wrap the cause here so diagnostics survive.
#[derive(Error, Debug)]
#[error("backend failure in vault '{vault}': {message}")]
pub struct BackendError {
    pub vault: String,
    pub message: String,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    /// Backend failure with a message only.
    pub fn new(vault: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            vault: vault.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Backend failure preserving the original cause.
    pub fn with_cause(
        vault: impl Into<String>,
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            vault: vault.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}

/// Settings file problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not initialized: run `crossvault init` first")]
    NotInitialized,

    #[error("already initialized: .crossvault.toml exists")]
    AlreadyInitialized,

    #[error("config error: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;
