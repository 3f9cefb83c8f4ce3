//! Crossvault - cross-environment secrets synchronization.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Initialize crossvault
//! │   ├── secrets       # Thin set/get/rm/list/history commands
//! │   ├── copy          # Single-key and bulk copy between contexts
//! │   ├── diff          # Cross-context comparison
//! │   ├── merge         # Template rendering
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # .crossvault.toml settings
//!     ├── driver/       # VaultDriver contract + registry
//!     │   ├── mod       # Trait, capabilities, DriverRegistry
//!     │   ├── memory    # In-process driver with version history
//!     │   └── file      # JSON-document driver without history
//!     ├── vaults        # Resolved slug -> driver pool
//!     ├── diff          # Comparison engine
//!     ├── copy          # Copy engine
//!     ├── template      # Template/merge engine
//!     ├── filter        # --only/--except glob filtering
//!     └── mask          # Display masking policy
//! ```
//!
//! # Features
//!
//! - One data model over heterogeneous vault backends
//! - Capability introspection instead of probe-and-catch
//! - Drift detection across any number of contexts
//! - Safe promotion with dry runs and per-key failure isolation
//! - Format-preserving template rendering

pub mod cli;
pub mod core;
pub mod error;
