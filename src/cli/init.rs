//! Init command - scaffold crossvault settings.

use tracing::info;

use crate::cli::output;
use crate::core::config::{self, Settings};
use crate::error::{ConfigError, Result};

/// Initialize crossvault in the current directory.
///
/// Writes a starter `.crossvault.toml` with a file-backed `local` vault
/// and protects local vault data via `.gitignore`.
pub fn execute() -> Result<()> {
    if Settings::exists() {
        return Err(ConfigError::AlreadyInitialized.into());
    }

    let namespace = std::env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "app".to_string());

    let settings = Settings::starter(&namespace);
    settings.save()?;
    config::ensure_gitignore()?;

    info!(namespace, "initialized");
    output::success("initialized .crossvault.toml");
    output::kv("namespace:", &namespace);
    output::kv("environments:", settings.environments.join(", "));
    output::kv("default vault:", &settings.default_vault);
    println!();
    output::hint("next: crossvault set KEY VALUE --context dev");
    Ok(())
}
