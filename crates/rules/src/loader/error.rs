//! Error types and load result structures for the rule loader.

use std::path::PathBuf;

use crate::model::Format;
use crate::schema::RuleKind;

/// Errors that can occur during rule loading and watching.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse/deserialization error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file parsed but its shape is invalid (empty name, no cards, ...).
    #[error("Structural rule error: {0}")]
    Structural(String),

    /// The repository or format directory does not exist or cannot be read.
    #[error("Rule repository unavailable: {}", .0.display())]
    RepositoryUnavailable(PathBuf),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single rule file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Rule was successfully loaded.
    Loaded { name: String, kind: RuleKind },
    /// File was skipped (dotfile, unsupported extension, etc.).
    Skipped { reason: String },
    /// Parse or structural error occurred; the file's rule was dropped.
    Failed { error: String },
}

/// Every file outcome from loading one format.
#[derive(Debug)]
pub struct LoadReport {
    pub format: Format,
    pub results: Vec<LoadResult>,
}

impl LoadReport {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            results: Vec::new(),
        }
    }

    /// Number of files loaded as `kind`.
    pub fn loaded(&self, kind: RuleKind) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.status, LoadStatus::Loaded { kind: k, .. } if *k == kind))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, LoadStatus::Skipped { .. }))
            .count()
    }
}
