//! Settings file management.
//!
//! Handles reading, writing, and validating `.crossvault.toml`: the
//! application namespace, the known environments, and the configured vaults
//! with their driver parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Project settings stored in `.crossvault.toml`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Application namespace, the first segment of every backend path.
    pub namespace: String,
    /// Known deployment environments, in promotion order.
    pub environments: Vec<String>,
    /// Vault used when a context string omits the vault part.
    pub default_vault: String,
    /// Configured vaults by slug.
    #[serde(default)]
    pub vaults: BTreeMap<String, VaultConfig>,
}

/// One configured vault: a driver type plus driver-specific parameters.
///
/// Unknown keys in the vault's TOML table flatten into `params`; each
/// driver factory pulls what it needs and ignores the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Driver type, looked up in the `DriverRegistry`.
    pub driver: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, toml::Value>,
}

impl VaultConfig {
    /// Config for a driver type with no parameters.
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a driver parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// A string-typed driver parameter, if present.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(|v| v.as_str())
    }

    /// A required string-typed driver parameter.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the vault and the missing
    /// parameter.
    pub fn require_param(&self, slug: &str, name: &str) -> Result<&str> {
        self.param_str(name).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "vault '{}' ({} driver) is missing the '{}' parameter",
                slug, self.driver, name
            ))
            .into()
        })
    }
}

impl Settings {
    /// Starter settings for `crossvault init`: a file-backed `local` vault
    /// and the conventional environment ladder.
    pub fn starter(namespace: &str) -> Self {
        let local = VaultConfig::new("file").with_param("path", ".crossvault/local.json");
        let mut vaults = BTreeMap::new();
        vaults.insert("local".to_string(), local);

        Self {
            namespace: namespace.to_string(),
            environments: constants::DEFAULT_ENVIRONMENTS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            default_vault: "local".to_string(),
            vaults,
        }
    }

    /// Path to the settings file in the current directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Path to the user-global settings file, if a config dir exists.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("crossvault").join("config.toml"))
    }

    /// Check if a settings file exists in the current directory.
    pub fn exists() -> bool {
        Self::config_path().exists()
    }

    /// Load settings, preferring `./.crossvault.toml` over the user-global
    /// file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if neither file exists.
    pub fn load() -> Result<Self> {
        let local = Self::config_path();
        if local.exists() {
            return Self::load_from(&local);
        }
        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                return Self::load_from(&global);
            }
        }
        Err(ConfigError::NotInitialized.into())
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");
        let contents = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&contents)?;
        settings.validate()?;

        debug!(
            vaults = settings.vaults.len(),
            environments = settings.environments.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Save settings to `.crossvault.toml` in the current directory.
    pub fn save(&self) -> Result<()> {
        debug!("saving settings");
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(Self::config_path(), contents)?;
        Ok(())
    }

    /// Whether an environment name is configured.
    pub fn has_environment(&self, environment: &str) -> bool {
        self.environments.iter().any(|e| e == environment)
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("namespace cannot be empty".to_string()).into());
        }
        if self.environments.is_empty() {
            return Err(
                ConfigError::Invalid("at least one environment is required".to_string()).into(),
            );
        }
        if !self.vaults.contains_key(&self.default_vault) {
            return Err(ConfigError::Invalid(format!(
                "default_vault '{}' is not a configured vault",
                self.default_vault
            ))
            .into());
        }
        Ok(())
    }
}

/// Ensure `.gitignore` covers rendered env files and local vault data.
///
/// Appends any missing entries; creates the file when absent.
pub fn ensure_gitignore() -> Result<()> {
    let path = Path::new(".gitignore");
    let existing = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let present: Vec<&str> = existing.lines().map(str::trim).collect();
    let missing: Vec<&str> = constants::GITIGNORE_ENTRIES
        .iter()
        .copied()
        .filter(|entry| !present.contains(entry))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    for entry in missing {
        updated.push_str(entry);
        updated.push('\n');
    }
    std::fs::write(path, updated)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_settings_validate() {
        let settings = Settings::starter("app");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.default_vault, "local");
        assert!(settings.has_environment("production"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let settings = Settings::starter("myapp");
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();

        assert_eq!(parsed.namespace, "myapp");
        assert_eq!(parsed.vaults["local"].driver, "file");
        assert_eq!(
            parsed.vaults["local"].param_str("path"),
            Some(".crossvault/local.json")
        );
    }

    #[test]
    fn test_extra_keys_flatten_into_params() {
        let text = r#"
            namespace = "app"
            environments = ["dev"]
            default_vault = "remote"

            [vaults.remote]
            driver = "file"
            path = "/tmp/vault.json"
            region = "eu-west-1"
        "#;
        let settings: Settings = toml::from_str(text).unwrap();
        let remote = &settings.vaults["remote"];
        assert_eq!(remote.param_str("path"), Some("/tmp/vault.json"));
        assert_eq!(remote.param_str("region"), Some("eu-west-1"));
    }

    #[test]
    fn test_validate_rejects_unknown_default_vault() {
        let text = r#"
            namespace = "app"
            environments = ["dev"]
            default_vault = "nope"
        "#;
        let settings: Settings = toml::from_str(text).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_require_param_names_vault_and_param() {
        let config = VaultConfig::new("file");
        let err = config.require_param("remote", "path").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("remote"));
        assert!(msg.contains("path"));
    }
}
