//! `VersionControl` backed by git2 for reads and the `git` binary for writes.
//!
//! Staging and committing shell out to the system `git` so the user's config,
//! hooks, signing setup, and credential helpers all apply.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git2::Repository;
use tracing::debug;

use super::hook;
use super::staged::{StagedChanges, detect_staged};
use super::VersionControl;
use crate::error::GitError;

/// A repository discovered from a starting directory.
#[derive(Debug, Clone)]
pub struct GitRepository {
    start_dir: PathBuf,
}

impl GitRepository {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
        }
    }

    /// Repository containing the process working directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    fn open(&self) -> Result<Repository, GitError> {
        Repository::discover(&self.start_dir).map_err(GitError::NotARepository)
    }

    /// Work tree root, falling back to the start directory for bare repos.
    fn work_tree(&self) -> PathBuf {
        self.open()
            .ok()
            .and_then(|repo| repo.workdir().map(Path::to_path_buf))
            .unwrap_or_else(|| self.start_dir.clone())
    }

    /// Run a git command in the work tree and return its output on success.
    fn run_git(&self, args: &[&str], operation: &str) -> Result<Output, String> {
        debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .current_dir(self.work_tree())
            .output()
            .map_err(|e| format!("Failed to run git {}: {}", operation, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            // `git commit` reports "nothing to commit" on stdout
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(detail);
        }

        Ok(output)
    }
}

impl VersionControl for GitRepository {
    fn verify_tool_installed(&self) -> Result<(), GitError> {
        which::which("git").map_err(|_| GitError::NotInstalled)?;

        let status = Command::new("git")
            .arg("--version")
            .output()
            .map_err(|_| GitError::NotInstalled)?
            .status;
        if !status.success() {
            return Err(GitError::NotInstalled);
        }
        Ok(())
    }

    fn verify_inside_repository(&self) -> Result<(), GitError> {
        self.open().map(|_| ())
    }

    fn stage_all_tracked(&self) -> Result<(), GitError> {
        self.run_git(&["add", "-u"], "stage tracked files")
            .map(|_| ())
            .map_err(GitError::StageFailed)
    }

    fn detect_staged_changes(&self) -> Result<StagedChanges, GitError> {
        let repo = self.open()?;
        detect_staged(&repo)
    }

    fn pre_commit_hook_path(&self) -> Option<PathBuf> {
        let repo = self.open().ok()?;
        hook::pre_commit_hook(&repo)
    }

    fn is_executable(&self, path: &Path) -> bool {
        hook::is_executable(path)
    }

    fn run_pre_commit_hook(&self, path: &Path) -> Result<(), GitError> {
        hook::run_hook(path, &self.work_tree())
    }

    fn commit(&self, message: &str) -> Result<String, GitError> {
        let output = self
            .run_git(&["commit", "-m", message], "commit")
            .map_err(GitError::CommitFailed)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}
