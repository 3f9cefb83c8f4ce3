//! Test support utilities for crossvault integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Settings written by `Test::init`: two file-backed vaults sharing the
/// `app` namespace.
const SETTINGS: &str = r#"
namespace = "app"
environments = ["dev", "staging", "production"]
default_vault = "local"

[vaults.local]
driver = "file"
path = ".crossvault/local.json"

[vaults.remote]
driver = "file"
path = ".crossvault/remote.json"
"#;

/// Test environment with an isolated temp directory.
///
/// No process-global state is mutated; child processes use
/// `.current_dir()` so tests can safely run in parallel.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment with settings for two file vaults.
    pub fn init() -> Self {
        let t = Self::new();
        std::fs::write(t.dir.path().join(".crossvault.toml"), SETTINGS)
            .expect("failed to write settings");
        t
    }

    /// Create a test environment with secrets seeded into `local:dev`.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let t = Self::init();
        for (k, v) in secrets {
            let output = t.set(k, v, "dev");
            assert!(
                output.status.success(),
                "Failed to set secret {}: {}",
                k,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    /// Write a file into the test directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Read a file from the test directory.
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("failed to read file")
    }
}
