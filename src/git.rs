//! Current-branch lookup.
//!
//! The commit check needs one fact from the outside world: which branch a
//! work tree has checked out. That fact comes through the `BranchLookup`
//! capability so tests can swap in a stub instead of spawning git.
//!
//! The real implementation shells out to `git rev-parse --abbrev-ref HEAD`
//! under a hard timeout. Any failure means "unknown", never an error for
//! the caller.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;

/// Answers "which branch is checked out in this directory?".
/// `None` for the directory means the process working directory.
pub trait BranchLookup {
    fn current_branch(&self, dir: Option<&Path>) -> Option<String>;
}

impl<F> BranchLookup for F
where
    F: Fn(Option<&Path>) -> Option<String>,
{
    fn current_branch(&self, dir: Option<&Path>) -> Option<String> {
        self(dir)
    }
}

/// Why a branch query produced no answer.
#[derive(Debug, Error)]
pub enum BranchQueryError {
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to start git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("git exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("git printed no branch name")]
    Empty,
}

/// Branch lookup backed by the `git` CLI.
#[derive(Debug, Clone)]
pub struct GitCli {
    timeout: Duration,
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run the query, keeping the reason when it fails.
    pub fn query(&self, dir: Option<&Path>) -> Result<String, BranchQueryError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BranchQueryError::Runtime)?;
        runtime.block_on(query_branch(dir, self.timeout))
    }
}

impl BranchLookup for GitCli {
    fn current_branch(&self, dir: Option<&Path>) -> Option<String> {
        match self.query(dir) {
            Ok(branch) => {
                tracing::debug!(?dir, %branch, "resolved current branch");
                Some(branch)
            }
            Err(e) => {
                tracing::debug!(?dir, error = %e, "branch unknown");
                None
            }
        }
    }
}

async fn query_branch(dir: Option<&Path>, timeout: Duration) -> Result<String, BranchQueryError> {
    let mut cmd = tokio::process::Command::new("git");
    if let Some(dir) = dir {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(["rev-parse", "--abbrev-ref", "HEAD"])
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| BranchQueryError::TimedOut(timeout))?
        .map_err(BranchQueryError::Spawn)?;

    if !output.status.success() {
        return Err(BranchQueryError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if branch.is_empty() {
        return Err(BranchQueryError::Empty);
    }
    Ok(branch)
}

/// Resolve the directory a `git -C` invocation runs in.
///
/// A relative `-C` path is taken relative to the host-reported working
/// directory when there is one. With neither, git runs in the process cwd.
pub fn resolve_worktree(c_path: Option<&str>, cwd: Option<&Path>) -> Option<PathBuf> {
    match (c_path, cwd) {
        (Some(path), Some(cwd)) => Some(cwd.join(path)),
        (Some(path), None) => Some(PathBuf::from(path)),
        (None, Some(cwd)) => Some(cwd.to_path_buf()),
        (None, None) => None,
    }
}
