//! Glob filtering for secret keys.
//!
//! Backs the `--only` / `--except` flags on diff and bulk copy. An empty
//! `only` set admits every key; `except` patterns subtract from whatever
//! `only` admitted.

use glob::Pattern;

use crate::error::{Result, ValidationError};

/// Compiled `--only` / `--except` pattern sets.
#[derive(Debug, Default)]
pub struct KeyFilter {
    only: Vec<Pattern>,
    except: Vec<Pattern>,
}

impl KeyFilter {
    /// Filter that admits every key.
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile a filter from comma-separated pattern lists.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPattern` if any glob fails to
    /// compile.
    pub fn parse(only: Option<&str>, except: Option<&str>) -> Result<Self> {
        Ok(Self {
            only: compile_csv(only)?,
            except: compile_csv(except)?,
        })
    }

    /// Whether any pattern was supplied.
    pub fn is_selective(&self) -> bool {
        !self.only.is_empty() || !self.except.is_empty()
    }

    /// Whether a key passes the filter.
    pub fn matches(&self, key: &str) -> bool {
        if !self.only.is_empty() && !self.only.iter().any(|p| p.matches(key)) {
            return false;
        }
        !self.except.iter().any(|p| p.matches(key))
    }

    /// Retain matching keys, preserving order.
    pub fn apply<'a, I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .filter(|k| self.matches(k))
            .map(|k| k.to_string())
            .collect()
    }
}

fn compile_csv(csv: Option<&str>) -> Result<Vec<Pattern>> {
    let Some(csv) = csv else {
        return Ok(Vec::new());
    };

    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| {
            Pattern::new(raw).map_err(|e| {
                ValidationError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
        })
        .collect()
}
