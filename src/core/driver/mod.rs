//! Vault driver contract and registry.
//!
//! Every backend implements the `VaultDriver` trait identically; callers
//! never see backend-specific types or errors. Driver construction goes
//! through an explicit `DriverRegistry` populated once at startup.
//!
//! ## Adding a New Driver
//!
//! 1. Implement the `VaultDriver` trait in a new file (e.g. `ssm.rs`)
//! 2. Write a factory with the `DriverFactory` signature
//! 3. Register it: `registry.register("ssm", ssm::factory)`
//!
//! ## Example
//!
//! ```ignore
//! fn factory(slug: &str, namespace: &str, config: &VaultConfig) -> Result<Box<dyn VaultDriver>> {
//!     let endpoint = config.require_param(slug, "endpoint")?;
//!     Ok(Box::new(SsmDriver::connect(slug, namespace, endpoint)?))
//! }
//! ```

use std::collections::BTreeMap;

use crate::core::config::VaultConfig;
use crate::core::secret::{Capabilities, Secret, VaultRef};
use crate::error::{NotFoundError, Result};

mod file;
mod memory;

pub use file::FileDriver;
pub use memory::MemoryDriver;

/// The polymorphic vault contract.
///
/// Implementations are `Send + Sync` with `&self` methods; backends that
/// mutate local state use interior mutability. Backend-originated failures
/// (auth, network, storage) must be wrapped into `BackendError` before they
/// cross this boundary.
pub trait VaultDriver: std::fmt::Debug + Send + Sync {
    /// The vault this driver serves.
    fn vault(&self) -> &VaultRef;

    /// Capability descriptor.
    ///
    /// Callers must consult this before invoking optional operations such
    /// as `history` rather than relying on a failure to detect support.
    fn capabilities(&self) -> Capabilities {
        self.vault().capabilities()
    }

    /// List all secrets in an environment, sorted by key ascending.
    fn list(&self, environment: &str) -> Result<Vec<Secret>>;

    /// Fetch a single secret.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Secret` if the key is absent.
    fn get(&self, key: &str, environment: &str) -> Result<Secret>;

    /// Write a secret, creating it at version 1 or incrementing the
    /// existing version by one.
    fn set(&self, key: &str, value: &str, environment: &str, secure: bool) -> Result<Secret>;

    /// Delete a secret.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Secret` if the key is absent.
    fn delete(&self, key: &str, environment: &str) -> Result<()>;

    /// Version history for a key, newest first, at most `limit` entries.
    ///
    /// Only valid when `capabilities().can_history`; drivers without
    /// history return `UnsupportedError`.
    fn history(&self, key: &str, environment: &str, limit: usize) -> Result<Vec<Secret>>;
}

/// Constructor signature for one driver type.
pub type DriverFactory = fn(&str, &str, &VaultConfig) -> Result<Box<dyn VaultDriver>>;

/// Explicit mapping from driver-type string to factory.
///
/// Populated once at startup and passed by reference wherever drivers are
/// constructed; there is no ambient global registry.
pub struct DriverRegistry {
    factories: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the bundled drivers registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("memory", memory::factory);
        registry.register("file", file::factory);
        registry
    }

    /// Register a driver type.
    ///
    /// Re-registering a type replaces the previous factory.
    pub fn register(&mut self, kind: &'static str, factory: DriverFactory) {
        self.factories.insert(kind, factory);
    }

    /// Construct a driver for a configured vault.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Driver` for an unregistered driver type.
    pub fn create(
        &self,
        slug: &str,
        namespace: &str,
        config: &VaultConfig,
    ) -> Result<Box<dyn VaultDriver>> {
        let factory = self
            .factories
            .get(config.driver.as_str())
            .ok_or_else(|| NotFoundError::Driver(config.driver.clone()))?;
        tracing::debug!(vault = slug, driver = %config.driver, "constructing driver");
        factory(slug, namespace, config)
    }

    /// Registered driver type names.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
