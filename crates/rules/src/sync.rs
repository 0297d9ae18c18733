//! Remote synchronization of the rule repository.
//!
//! The reload manager calls a [`RuleSync`] before re-parsing changed formats
//! and bounds it with a timeout. Any failure leaves the on-disk state as is
//! and the reload goes ahead.

use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Errors from a sync attempt. All of them are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The sync did not finish within its budget.
    #[error("sync timed out after {0:?}")]
    Timeout(Duration),

    /// The sync command ran and failed.
    #[error("sync command failed ({status}): {stderr}")]
    Command { status: ExitStatus, stderr: String },

    /// The sync command could not be started.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pulls the latest rule repository state into `repo`.
#[async_trait]
pub trait RuleSync: Send + Sync {
    async fn sync(&self, repo: &Path) -> Result<(), SyncError>;

    fn name(&self) -> &str;
}

/// Run `sync` with a timeout, logging and returning the outcome.
pub async fn sync_with_timeout(
    sync: &dyn RuleSync,
    repo: &Path,
    timeout: Duration,
) -> Result<(), SyncError> {
    let result = match tokio::time::timeout(timeout, sync.sync(repo)).await {
        Ok(result) => result,
        Err(_) => Err(SyncError::Timeout(timeout)),
    };
    match &result {
        Ok(()) => info!(sync = sync.name(), repo = %repo.display(), "rule repository synced"),
        Err(e) => warn!(
            sync = sync.name(),
            repo = %repo.display(),
            error = %e,
            "rule repository sync failed, reloading from local state"
        ),
    }
    result
}

/// `git pull --ff-only` in the repository directory.
#[derive(Debug, Clone)]
pub struct GitSync {
    remote: String,
    branch: Option<String>,
}

impl GitSync {
    pub fn new(remote: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            remote: remote.into(),
            branch,
        }
    }

    fn args(&self) -> Vec<&str> {
        let mut args = vec!["pull", "--ff-only", "--quiet", self.remote.as_str()];
        if let Some(branch) = &self.branch {
            args.push(branch);
        }
        args
    }
}

#[async_trait]
impl RuleSync for GitSync {
    async fn sync(&self, repo: &Path) -> Result<(), SyncError> {
        let args = self.args();
        debug!(args = ?args, dir = %repo.display(), "running git command");

        // Dropping the future on timeout kills the child.
        let output = Command::new("git")
            .args(&args)
            .current_dir(repo)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(SyncError::Command {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "git"
    }
}
