//! Copy engine.
//!
//! Promotes secrets between contexts, single-key or in bulk by glob
//! pattern. Bulk copies evaluate every matched key independently; failed
//! keys are reported, successful keys are committed, and the caller
//! decides the exit code from the aggregate report.

use crate::core::context::Context;
use crate::core::filter::KeyFilter;
use crate::core::vaults::VaultPool;
use crate::error::{ConflictError, Error, NotFoundError, Result, ValidationError};

/// What a copy did (or would do) to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAction {
    /// The destination had no such key.
    Created,
    /// The destination key was overwritten.
    Updated,
}

impl std::fmt::Display for CopyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CopyAction::Created => write!(f, "created"),
            CopyAction::Updated => write!(f, "updated"),
        }
    }
}

/// Caller inputs shared by single-key and bulk copies.
#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub source: Context,
    pub destination: Context,
    pub overwrite: bool,
    pub dry_run: bool,
}

/// Result of one committed or previewed copy.
#[derive(Debug)]
pub struct CopyOutcome {
    key: String,
    action: CopyAction,
    version: Option<u64>,
    source_path: String,
    destination_path: String,
    value: String,
    secure: bool,
    dry_run: bool,
}

impl CopyOutcome {
    /// The copied key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Created or updated.
    pub fn action(&self) -> CopyAction {
        self.action
    }

    /// Version assigned by the destination backend; absent on dry runs.
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// Fully-qualified source path.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Fully-qualified destination path.
    pub fn destination_path(&self) -> &str {
        &self.destination_path
    }

    /// The raw copied value. Display callers mask this.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the source secret was marked sensitive.
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Whether this was a preview without a write.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Copy one key from source to destination.
///
/// # Errors
///
/// - `ValidationError::SameContext` when source equals destination.
/// - `NotFoundError::Secret` when the source lacks the key.
/// - `ConflictError::SecretExists` when the destination already has the
///   key and `overwrite` is false; no mutation is performed.
///
/// Dry runs perform every validation and return a preview without calling
/// the destination's `set`.
pub fn copy_key(pool: &VaultPool, key: &str, request: &CopyRequest) -> Result<CopyOutcome> {
    if request.source == request.destination {
        return Err(ValidationError::SameContext(request.source.to_string()).into());
    }

    let source = pool.resolve(&request.source)?;
    let destination = pool.resolve(&request.destination)?;

    let secret = source.get(key, request.source.environment())?;

    let existing = match destination.get(key, request.destination.environment()) {
        Ok(_) => true,
        Err(Error::NotFound(NotFoundError::Secret { .. })) => false,
        Err(e) => return Err(e),
    };

    if existing && !request.overwrite {
        return Err(ConflictError::SecretExists {
            key: key.to_string(),
            context: request.destination.to_string(),
        }
        .into());
    }

    let action = if existing {
        CopyAction::Updated
    } else {
        CopyAction::Created
    };
    let source_path = secret.path();
    let destination_path = destination
        .vault()
        .secret_path(request.destination.environment(), key);

    if request.dry_run {
        return Ok(CopyOutcome {
            key: key.to_string(),
            action,
            version: None,
            source_path,
            destination_path,
            value: secret.value().to_string(),
            secure: secret.secure(),
            dry_run: true,
        });
    }

    // The secure flag travels with the value; the destination must not
    // fall back to a default.
    let written = destination.set(
        key,
        secret.value(),
        request.destination.environment(),
        secret.secure(),
    )?;
    tracing::info!(
        key,
        from = %request.source,
        to = %request.destination,
        version = written.version(),
        "copied"
    );

    Ok(CopyOutcome {
        key: key.to_string(),
        action,
        version: Some(written.version()),
        source_path,
        destination_path,
        value: written.value().to_string(),
        secure: written.secure(),
        dry_run: false,
    })
}

/// Per-key status in a bulk report.
#[derive(Debug)]
pub enum BulkStatus {
    Done(CopyOutcome),
    Failed { kind: &'static str, message: String },
}

/// One matched key's line in the aggregate result table.
#[derive(Debug)]
pub struct BulkEntry {
    key: String,
    status: BulkStatus,
}

impl BulkEntry {
    /// The matched key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Outcome or failure.
    pub fn status(&self) -> &BulkStatus {
        &self.status
    }

    /// Whether this key failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, BulkStatus::Failed { .. })
    }
}

/// Aggregate result of a bulk copy.
#[derive(Debug)]
pub struct BulkCopyReport {
    entries: Vec<BulkEntry>,
}

impl BulkCopyReport {
    /// Entries in source key order.
    pub fn entries(&self) -> &[BulkEntry] {
        &self.entries
    }

    /// Number of matched keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failed keys.
    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failed()).count()
    }

    /// Whether at least one key failed; drives the non-zero exit code.
    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| e.is_failed())
    }
}

/// Copy every source key matching the filter.
///
/// Keys are evaluated independently against the single-key rules; one
/// key's failure neither rolls back nor stops the others. Writes to the
/// destination happen sequentially in key order, so backend-assigned
/// versions land in a deterministic order.
///
/// # Errors
///
/// Fails up front (before any write) when source equals destination or
/// the source listing itself fails. A filter matching zero keys is a
/// successful empty report.
pub fn copy_matching(
    pool: &VaultPool,
    filter: &KeyFilter,
    request: &CopyRequest,
) -> Result<BulkCopyReport> {
    if request.source == request.destination {
        return Err(ValidationError::SameContext(request.source.to_string()).into());
    }

    let source = pool.resolve(&request.source)?;
    let secrets = source.list(request.source.environment())?;
    let keys = filter.apply(secrets.iter().map(|s| s.key()));
    tracing::debug!(
        matched = keys.len(),
        from = %request.source,
        to = %request.destination,
        "bulk copy"
    );

    let entries = keys
        .into_iter()
        .map(|key| {
            let status = match copy_key(pool, &key, request) {
                Ok(outcome) => BulkStatus::Done(outcome),
                Err(e) => BulkStatus::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                },
            };
            BulkEntry { key, status }
        })
        .collect();

    Ok(BulkCopyReport { entries })
}
