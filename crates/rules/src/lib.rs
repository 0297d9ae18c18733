//! Archetype classification rule engine.
//!
//! This crate provides:
//! - JSON/YAML rule files (archetypes with variants, fallbacks) parsed into
//!   typed condition trees
//! - Per-format rule loading that isolates broken files
//! - An atomic, versioned snapshot store read concurrently by classifiers
//! - Archetype-then-fallback classification of decklists
//! - Hot reload of changed formats via a debounced `notify` watcher, with an
//!   optional `git pull` before each reload

pub mod classifier;
pub mod evaluator;
pub mod loader;
pub mod model;
pub mod reload;
pub mod schema;
pub mod store;
pub mod sync;

pub use classifier::{ClassificationMethod, ClassificationResult, Classifier};
pub use loader::{LoadReport, RuleError, RuleLoader};
pub use model::{Format, RuleSet, RuleSnapshot};
pub use reload::{ReloadHandle, ReloadManager, ReloadOptions};
pub use store::{FormatStats, RuleStore};
