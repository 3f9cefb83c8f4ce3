//! Thin single-secret commands.
//!
//! `set`, `get`, `rm`, `list`, and `history` are direct callers of the
//! driver contract; all cross-context logic lives in the core engines.

use crate::cli::output;
use crate::core::mask::mask_unless;
use crate::core::validation::validate_key;
use crate::core::vaults::VaultPool;
use crate::error::{ConflictError, Error, NotFoundError, Result, UnsupportedError};

/// Set a secret value.
pub fn set(
    pool: &VaultPool,
    key: &str,
    value: &str,
    context: &str,
    secure: bool,
    force: bool,
) -> Result<()> {
    validate_key(key)?;
    let context = pool.parse_context(context)?;
    let driver = pool.resolve(&context)?;

    let exists = match driver.get(key, context.environment()) {
        Ok(_) => true,
        Err(Error::NotFound(NotFoundError::Secret { .. })) => false,
        Err(e) => return Err(e),
    };
    if exists && !force {
        return Err(ConflictError::SecretExists {
            key: key.to_string(),
            context: context.to_string(),
        }
        .into());
    }

    let secret = driver.set(key, value, context.environment(), secure)?;
    output::success(&format!(
        "set {} in {} (v{})",
        output::key(key),
        output::context(&context.to_string()),
        secret.version()
    ));
    Ok(())
}

/// Get a secret value, masked unless `reveal`.
pub fn get(pool: &VaultPool, key: &str, context: &str, reveal: bool) -> Result<()> {
    let context = pool.parse_context(context)?;
    let driver = pool.resolve(&context)?;
    let secret = driver.get(key, context.environment())?;
    println!("{}", mask_unless(secret.value(), reveal));
    Ok(())
}

/// Remove a secret.
pub fn rm(pool: &VaultPool, key: &str, context: &str) -> Result<()> {
    let context = pool.parse_context(context)?;
    let driver = pool.resolve(&context)?;
    driver.delete(key, context.environment())?;
    output::success(&format!(
        "removed {} from {}",
        output::key(key),
        output::context(&context.to_string())
    ));
    Ok(())
}

/// List secrets in a context.
pub fn list(pool: &VaultPool, context: &str, json: bool) -> Result<()> {
    let context = pool.parse_context(context)?;
    let driver = pool.resolve(&context)?;
    let secrets = driver.list(context.environment())?;

    if json {
        let entries: Vec<_> = secrets
            .iter()
            .map(|s| {
                serde_json::json!({
                    "key": s.key(),
                    "version": s.version(),
                    "secure": s.secure(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if secrets.is_empty() {
        output::dimmed(&format!("no secrets in {}", context));
        return Ok(());
    }

    output::header(&format!("{} secrets in {}", secrets.len(), context));
    for secret in secrets {
        let marker = if secret.secure() { " (secure)" } else { "" };
        output::list_item(&format!("{} v{}{}", secret.key(), secret.version(), marker));
    }
    Ok(())
}

/// Show a secret's version history, newest first.
pub fn history(pool: &VaultPool, key: &str, context: &str, limit: usize) -> Result<()> {
    let context = pool.parse_context(context)?;
    let driver = pool.resolve(&context)?;

    // Capability check up front so the user gets a clean message instead
    // of a raw backend error.
    if !driver.capabilities().can_history {
        return Err(UnsupportedError {
            vault: context.vault().to_string(),
            operation: "version history",
        }
        .into());
    }

    let versions = driver.history(key, context.environment(), limit)?;
    output::header(&format!("{} in {}", key, context));
    for secret in versions {
        output::kv(
            &format!("v{}", secret.version()),
            mask_unless(secret.value(), false),
        );
    }
    Ok(())
}
