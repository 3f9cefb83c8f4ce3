//! Cross-context comparison engine.
//!
//! Compares the same key space across any number of (vault, environment)
//! contexts and classifies each key by agreement. A context whose listing
//! fails is dropped with a warning rather than aborting the comparison.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::context::Context;
use crate::core::filter::KeyFilter;
use crate::core::vaults::VaultPool;
use crate::error::{Result, ValidationError};

/// Agreement classification for one key across all surviving contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Present in every context with string-equal values.
    Identical,
    /// Present in every context, but not all values agree.
    Different,
    /// Absent from at least one context.
    Incomplete,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Classification::Identical => "identical",
            Classification::Different => "different",
            Classification::Incomplete => "incomplete",
        };
        write!(f, "{}", label)
    }
}

/// One key's state in one context.
#[derive(Debug, Clone)]
pub struct Cell {
    present: bool,
    value: Option<String>,
}

impl Cell {
    fn present(value: String) -> Self {
        Self {
            present: true,
            value: Some(value),
        }
    }

    fn absent() -> Self {
        Self {
            present: false,
            value: None,
        }
    }

    /// Whether the key exists in this context.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Raw value when present. Masking is the caller's concern.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// One key's row: a cell per surviving context plus the classification.
#[derive(Debug)]
pub struct KeyRow {
    key: String,
    cells: Vec<Cell>,
    classification: Classification,
}

impl KeyRow {
    /// The key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cells in the comparison's context order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Agreement classification.
    pub fn classification(&self) -> Classification {
        self.classification
    }
}

/// Aggregate counts over all compared keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    identical: usize,
    different: usize,
    incomplete: usize,
}

impl Summary {
    /// Keys classified Identical.
    pub fn identical(&self) -> usize {
        self.identical
    }

    /// Keys classified Different.
    pub fn different(&self) -> usize {
        self.different
    }

    /// Keys classified Incomplete.
    pub fn incomplete(&self) -> usize {
        self.incomplete
    }

    /// Total keys compared.
    pub fn total(&self) -> usize {
        self.identical + self.different + self.incomplete
    }

    /// Share of the total as a rounded integer percentage.
    pub fn percent(&self, count: usize) -> u32 {
        if self.total() == 0 {
            return 0;
        }
        ((count as f64 / self.total() as f64) * 100.0).round() as u32
    }
}

/// The computed comparison matrix.
#[derive(Debug)]
pub struct Comparison {
    contexts: Vec<Context>,
    warnings: Vec<String>,
    rows: Vec<KeyRow>,
    summary: Summary,
}

impl Comparison {
    /// Compare the requested contexts.
    ///
    /// Each context's keys are listed through its resolved driver; a
    /// context that fails to resolve or list is recorded as a warning and
    /// dropped. Keys are the filtered union across surviving contexts,
    /// sorted ascending and case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoContexts` when no context survives.
    /// Zero keys across surviving contexts is a successful empty result.
    pub fn compute(pool: &VaultPool, contexts: &[Context], filter: &KeyFilter) -> Result<Self> {
        let mut surviving: Vec<Context> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut maps: Vec<BTreeMap<String, String>> = Vec::new();

        for context in contexts {
            let listed = pool
                .resolve(context)
                .and_then(|driver| driver.list(context.environment()));
            match listed {
                Ok(secrets) => {
                    let map = secrets
                        .into_iter()
                        .map(|s| (s.key().to_string(), s.value().to_string()))
                        .collect();
                    surviving.push(context.clone());
                    maps.push(map);
                }
                Err(e) => {
                    tracing::warn!(context = %context, error = %e, "context dropped from comparison");
                    warnings.push(format!("skipping {}: {}", context, e));
                }
            }
        }

        if surviving.is_empty() {
            return Err(ValidationError::NoContexts.into());
        }

        let all_keys: BTreeSet<&str> = maps
            .iter()
            .flat_map(|m| m.keys().map(String::as_str))
            .filter(|k| filter.matches(k))
            .collect();

        let mut rows = Vec::with_capacity(all_keys.len());
        let mut summary = Summary::default();

        for key in all_keys {
            let cells: Vec<Cell> = maps
                .iter()
                .map(|m| match m.get(key) {
                    Some(value) => Cell::present(value.clone()),
                    None => Cell::absent(),
                })
                .collect();

            let classification = classify(&cells);
            match classification {
                Classification::Identical => summary.identical += 1,
                Classification::Different => summary.different += 1,
                Classification::Incomplete => summary.incomplete += 1,
            }

            rows.push(KeyRow {
                key: key.to_string(),
                cells,
                classification,
            });
        }

        Ok(Self {
            contexts: surviving,
            warnings,
            rows,
            summary,
        })
    }

    /// Surviving contexts, in request order.
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Warnings for dropped contexts.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Rows sorted by key ascending.
    pub fn rows(&self) -> &[KeyRow] {
        &self.rows
    }

    /// Aggregate counts.
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Row for a specific key, if it was compared.
    pub fn row(&self, key: &str) -> Option<&KeyRow> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// Not all present values pairwise equal ⇒ Different; any absence ⇒
/// Incomplete regardless of agreement among the present values.
fn classify(cells: &[Cell]) -> Classification {
    if cells.iter().any(|c| !c.present) {
        return Classification::Incomplete;
    }

    let mut values = cells.iter().filter_map(|c| c.value());
    let first = values.next();
    if values.all(|v| Some(v) == first) {
        Classification::Identical
    } else {
        Classification::Different
    }
}
