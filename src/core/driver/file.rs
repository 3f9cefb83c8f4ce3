//! JSON-file driver.
//!
//! One JSON document on disk holding current-version records per
//! environment. Models a parameter store without version history:
//! `can_history` is false, and deleting a key discards its write count, so
//! re-creation restarts at version 1.
//!
//! Storage failures (io, malformed JSON) surface as `BackendError` with the
//! original cause attached; this driver never leaks `serde_json` or io
//! error types through the `VaultDriver` boundary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::config::VaultConfig;
use crate::core::driver::VaultDriver;
use crate::core::secret::{Capabilities, Secret, VaultRef};
use crate::error::{BackendError, NotFoundError, Result};

/// Registry factory for `driver = "file"`.
///
/// Requires a `path` parameter in the vault's configuration table.
pub fn factory(slug: &str, namespace: &str, config: &VaultConfig) -> Result<Box<dyn VaultDriver>> {
    let path = config.require_param(slug, "path")?;
    Ok(Box::new(FileDriver::new(
        VaultRef::new(slug, namespace, Capabilities::without_history()),
        PathBuf::from(path),
    )))
}

/// Current-version record as stored on disk.
///
/// `updated_at` is written for operators inspecting the file; the engines
/// never read it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    value: String,
    version: u64,
    secure: bool,
    updated_at: DateTime<Utc>,
}

/// environment -> key -> record
type Document = BTreeMap<String, BTreeMap<String, Record>>;

/// Vault driver backed by a single JSON document.
#[derive(Debug)]
pub struct FileDriver {
    vault: VaultRef,
    path: PathBuf,
}

impl FileDriver {
    /// Create a driver over the document at `path`.
    ///
    /// The file is created lazily on first write; a missing file reads as
    /// an empty vault.
    pub fn new(vault: VaultRef, path: PathBuf) -> Self {
        Self { vault, path }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backend_err(
        &self,
        message: &str,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> crate::error::Error {
        BackendError::with_cause(self.vault.slug(), message, cause).into()
    }

    fn missing(&self, key: &str, environment: &str) -> crate::error::Error {
        NotFoundError::Secret {
            key: key.to_string(),
            context: format!("{}:{}", self.vault.slug(), environment),
        }
        .into()
    }

    fn load(&self) -> Result<Document> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| self.backend_err("malformed vault document", e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(self.backend_err("cannot read vault document", e)),
        }
    }

    fn store(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| self.backend_err("cannot create vault directory", e))?;
            }
        }
        let data = serde_json::to_vec_pretty(document)
            .map_err(|e| self.backend_err("cannot serialize vault document", e))?;
        std::fs::write(&self.path, data)
            .map_err(|e| self.backend_err("cannot write vault document", e))
    }

    fn to_secret(&self, key: &str, environment: &str, record: &Record) -> Secret {
        Secret::new(
            key,
            record.value.clone(),
            record.version,
            record.secure,
            environment,
            self.vault.clone(),
        )
    }
}

impl VaultDriver for FileDriver {
    fn vault(&self) -> &VaultRef {
        &self.vault
    }

    fn list(&self, environment: &str) -> Result<Vec<Secret>> {
        let document = self.load()?;
        Ok(document
            .get(environment)
            .map(|keys| {
                keys.iter()
                    .map(|(key, record)| self.to_secret(key, environment, record))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get(&self, key: &str, environment: &str) -> Result<Secret> {
        let document = self.load()?;
        document
            .get(environment)
            .and_then(|keys| keys.get(key))
            .map(|record| self.to_secret(key, environment, record))
            .ok_or_else(|| self.missing(key, environment))
    }

    fn set(&self, key: &str, value: &str, environment: &str, secure: bool) -> Result<Secret> {
        let mut document = self.load()?;
        let keys = document.entry(environment.to_string()).or_default();
        let version = keys.get(key).map(|r| r.version + 1).unwrap_or(1);
        let record = Record {
            value: value.to_string(),
            version,
            secure,
            updated_at: Utc::now(),
        };
        keys.insert(key.to_string(), record.clone());
        self.store(&document)?;
        tracing::debug!(vault = self.vault.slug(), key, environment, version, "set");
        Ok(self.to_secret(key, environment, &record))
    }

    fn delete(&self, key: &str, environment: &str) -> Result<()> {
        let mut document = self.load()?;
        let removed = document
            .get_mut(environment)
            .and_then(|keys| keys.remove(key))
            .is_some();
        if !removed {
            return Err(self.missing(key, environment));
        }
        self.store(&document)
    }

    fn history(&self, _key: &str, _environment: &str, _limit: usize) -> Result<Vec<Secret>> {
        Err(crate::error::UnsupportedError {
            vault: self.vault.slug().to_string(),
            operation: "version history",
        }
        .into())
    }
}
