//! Resolved vault pool.
//!
//! Built once at startup from settings plus the driver registry, then
//! passed by reference into the diff, copy, and merge engines. Holds one
//! constructed driver per configured vault, the default vault slug, and the
//! known environments.

use std::collections::BTreeMap;

use crate::core::config::Settings;
use crate::core::context::Context;
use crate::core::driver::{DriverRegistry, VaultDriver};
use crate::error::{NotFoundError, Result};

/// Slug-addressable collection of constructed drivers.
pub struct VaultPool {
    drivers: BTreeMap<String, Box<dyn VaultDriver>>,
    default_vault: String,
    environments: Vec<String>,
}

impl VaultPool {
    /// Construct every configured vault's driver through the registry.
    ///
    /// # Errors
    ///
    /// Fails fast if any driver type is unknown or a driver factory
    /// rejects its parameters; a half-usable pool is not constructed.
    pub fn from_settings(settings: &Settings, registry: &DriverRegistry) -> Result<Self> {
        let mut drivers = BTreeMap::new();
        for (slug, config) in &settings.vaults {
            let driver = registry.create(slug, &settings.namespace, config)?;
            drivers.insert(slug.clone(), driver);
        }

        Ok(Self {
            drivers,
            default_vault: settings.default_vault.clone(),
            environments: settings.environments.clone(),
        })
    }

    /// Empty pool for assembling by hand (tests, embedders).
    pub fn new(default_vault: impl Into<String>, environments: Vec<String>) -> Self {
        Self {
            drivers: BTreeMap::new(),
            default_vault: default_vault.into(),
            environments,
        }
    }

    /// Add a constructed driver, keyed by its vault slug.
    pub fn insert(&mut self, driver: Box<dyn VaultDriver>) {
        self.drivers.insert(driver.vault().slug().to_string(), driver);
    }

    /// The vault used when a context string omits the vault part.
    pub fn default_vault(&self) -> &str {
        &self.default_vault
    }

    /// Known environments, in configured order.
    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    /// Configured vault slugs, sorted.
    pub fn slugs(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }

    /// Look up a driver by vault slug.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Vault` for an unknown slug.
    pub fn driver(&self, slug: &str) -> Result<&dyn VaultDriver> {
        self.drivers
            .get(slug)
            .map(|d| d.as_ref())
            .ok_or_else(|| NotFoundError::Vault(slug.to_string()).into())
    }

    /// Resolve a context to its driver, validating both halves.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Vault` or `NotFoundError::Environment`.
    pub fn resolve(&self, context: &Context) -> Result<&dyn VaultDriver> {
        if !self.environments.iter().any(|e| e == context.environment()) {
            return Err(NotFoundError::Environment(context.environment().to_string()).into());
        }
        self.driver(context.vault())
    }

    /// Parse a context string against this pool's default vault.
    pub fn parse_context(&self, input: &str) -> Result<Context> {
        Context::parse(input, &self.default_vault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::driver::MemoryDriver;
    use crate::core::secret::{Capabilities, VaultRef};
    use crate::error::Error;

    fn pool() -> VaultPool {
        let mut pool = VaultPool::new(
            "local",
            vec!["dev".to_string(), "production".to_string()],
        );
        pool.insert(Box::new(MemoryDriver::new(VaultRef::new(
            "local",
            "app",
            Capabilities::all(),
        ))));
        pool
    }

    #[test]
    fn test_resolve_known_context() {
        let pool = pool();
        let ctx = pool.parse_context("dev").unwrap();
        assert_eq!(ctx, Context::new("local", "dev"));
        assert!(pool.resolve(&ctx).is_ok());
    }

    #[test]
    fn test_resolve_unknown_vault() {
        let pool = pool();
        let ctx = Context::new("ghost", "dev");
        assert!(matches!(
            pool.resolve(&ctx).unwrap_err(),
            Error::NotFound(NotFoundError::Vault(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_environment() {
        let pool = pool();
        let ctx = Context::new("local", "qa");
        assert!(matches!(
            pool.resolve(&ctx).unwrap_err(),
            Error::NotFound(NotFoundError::Environment(_))
        ));
    }

    #[test]
    fn test_from_settings_builds_all_drivers() {
        let settings = crate::core::config::Settings {
            namespace: "app".to_string(),
            environments: vec!["dev".to_string()],
            default_vault: "scratch".to_string(),
            vaults: [(
                "scratch".to_string(),
                crate::core::config::VaultConfig::new("memory"),
            )]
            .into_iter()
            .collect(),
        };
        let registry = DriverRegistry::builtin();
        let pool = VaultPool::from_settings(&settings, &registry).unwrap();
        assert_eq!(pool.slugs(), vec!["scratch"]);
        assert_eq!(pool.default_vault(), "scratch");
    }
}
