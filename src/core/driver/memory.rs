//! In-memory driver.
//!
//! Process-local store with the full capability set, including version
//! history. Backs engine tests and throwaway `scratch` vaults; nothing
//! survives the process.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::core::config::VaultConfig;
use crate::core::driver::VaultDriver;
use crate::core::secret::{Capabilities, Secret, VaultRef};
use crate::error::{NotFoundError, Result};

/// Registry factory for `driver = "memory"`.
pub fn factory(slug: &str, namespace: &str, _config: &VaultConfig) -> Result<Box<dyn VaultDriver>> {
    Ok(Box::new(MemoryDriver::new(VaultRef::new(
        slug,
        namespace,
        Capabilities::all(),
    ))))
}

#[derive(Debug, Clone)]
struct Revision {
    value: String,
    secure: bool,
}

/// environment -> key -> revisions, oldest first. Version is index + 1.
type Cells = BTreeMap<String, BTreeMap<String, Vec<Revision>>>;

/// In-process vault driver retaining full write history per key.
#[derive(Debug)]
pub struct MemoryDriver {
    vault: VaultRef,
    cells: Mutex<Cells>,
}

impl MemoryDriver {
    /// Create an empty in-memory vault.
    pub fn new(vault: VaultRef) -> Self {
        Self {
            vault,
            cells: Mutex::new(Cells::new()),
        }
    }

    fn with_cells<T>(&self, f: impl FnOnce(&mut Cells) -> T) -> T {
        let mut guard = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    fn missing(&self, key: &str, environment: &str) -> crate::error::Error {
        NotFoundError::Secret {
            key: key.to_string(),
            context: format!("{}:{}", self.vault.slug(), environment),
        }
        .into()
    }

    fn to_secret(&self, key: &str, environment: &str, version: u64, rev: &Revision) -> Secret {
        Secret::new(
            key,
            rev.value.clone(),
            version,
            rev.secure,
            environment,
            self.vault.clone(),
        )
    }
}

impl VaultDriver for MemoryDriver {
    fn vault(&self) -> &VaultRef {
        &self.vault
    }

    fn list(&self, environment: &str) -> Result<Vec<Secret>> {
        Ok(self.with_cells(|cells| {
            cells
                .get(environment)
                .map(|keys| {
                    keys.iter()
                        .filter_map(|(key, revisions)| {
                            revisions.last().map(|rev| {
                                self.to_secret(key, environment, revisions.len() as u64, rev)
                            })
                        })
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    fn get(&self, key: &str, environment: &str) -> Result<Secret> {
        self.with_cells(|cells| {
            cells
                .get(environment)
                .and_then(|keys| keys.get(key))
                .and_then(|revisions| {
                    revisions
                        .last()
                        .map(|rev| self.to_secret(key, environment, revisions.len() as u64, rev))
                })
                .ok_or_else(|| self.missing(key, environment))
        })
    }

    fn set(&self, key: &str, value: &str, environment: &str, secure: bool) -> Result<Secret> {
        self.with_cells(|cells| {
            let revisions = cells
                .entry(environment.to_string())
                .or_default()
                .entry(key.to_string())
                .or_default();
            let rev = Revision {
                value: value.to_string(),
                secure,
            };
            revisions.push(rev.clone());
            let version = revisions.len() as u64;
            tracing::debug!(vault = self.vault.slug(), key, environment, version, "set");
            Ok(self.to_secret(key, environment, version, &rev))
        })
    }

    fn delete(&self, key: &str, environment: &str) -> Result<()> {
        self.with_cells(|cells| {
            let removed = cells
                .get_mut(environment)
                .and_then(|keys| keys.remove(key))
                .is_some();
            if removed {
                Ok(())
            } else {
                Err(self.missing(key, environment))
            }
        })
    }

    fn history(&self, key: &str, environment: &str, limit: usize) -> Result<Vec<Secret>> {
        self.with_cells(|cells| {
            let revisions = cells
                .get(environment)
                .and_then(|keys| keys.get(key))
                .ok_or_else(|| self.missing(key, environment))?;

            Ok(revisions
                .iter()
                .enumerate()
                .rev()
                .take(limit)
                .map(|(idx, rev)| self.to_secret(key, environment, idx as u64 + 1, rev))
                .collect())
        })
    }
}
