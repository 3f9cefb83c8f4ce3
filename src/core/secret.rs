//! Secret and vault reference types.
//!
//! Value types shared by every engine: a versioned secret, the vault it
//! belongs to, and the capability descriptor drivers expose.

/// Optional operations a driver supports.
///
/// Queried before any optional call is attempted; callers must not probe
/// support by catching failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_list: bool,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
    pub can_history: bool,
}

impl Capabilities {
    /// Full capability set.
    pub fn all() -> Self {
        Self {
            can_list: true,
            can_read: true,
            can_write: true,
            can_delete: true,
            can_history: true,
        }
    }

    /// Everything except version history.
    pub fn without_history() -> Self {
        Self {
            can_history: false,
            ..Self::all()
        }
    }
}

/// Reference to a configured vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRef {
    slug: String,
    namespace: String,
    capabilities: Capabilities,
}

impl VaultRef {
    /// Create a new vault reference.
    pub fn new(
        slug: impl Into<String>,
        namespace: impl Into<String>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            slug: slug.into(),
            namespace: namespace.into(),
            capabilities,
        }
    }

    /// Vault slug as configured in settings.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Application namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The driver's capability descriptor.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Fully-qualified backend path for a secret.
    ///
    /// Deterministic across drivers so that diff and copy across backends
    /// compare the same logical location: `/namespace/environment/key`.
    pub fn secret_path(&self, environment: &str, key: &str) -> String {
        format!("/{}/{}/{}", self.namespace, environment, key)
    }
}

/// A single versioned secret as returned by a driver.
///
/// Instances are created by driver calls and read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    key: String,
    value: String,
    version: u64,
    secure: bool,
    environment: String,
    vault: VaultRef,
}

impl Secret {
    /// Create a new secret record.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        version: u64,
        secure: bool,
        environment: impl Into<String>,
        vault: VaultRef,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            version,
            secure,
            environment: environment.into(),
            vault,
        }
    }

    /// Secret key name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Plaintext value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Write-history position, starting at 1.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the value is treated as sensitive for masking.
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Environment this secret is scoped to.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// The vault holding this secret.
    pub fn vault(&self) -> &VaultRef {
        &self.vault
    }

    /// Fully-qualified backend path.
    pub fn path(&self) -> String {
        self.vault.secret_path(&self.environment, &self.key)
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (v{})", self.path(), self.version)
    }
}
