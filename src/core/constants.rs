//! Constants used throughout crossvault.
//!
//! Centralizes magic strings and configuration values.

/// Settings file name (.crossvault.toml).
pub const CONFIG_FILE: &str = ".crossvault.toml";

/// Environments scaffolded by `crossvault init`.
pub const DEFAULT_ENVIRONMENTS: &[&str] = &["dev", "staging", "production"];

/// Default limit for `history` output.
pub const HISTORY_LIMIT: usize = 10;

/// Gitignore entries to protect local vault data and rendered env files.
pub const GITIGNORE_ENTRIES: &[&str] = &[".env", ".env.*", ".crossvault/"];
