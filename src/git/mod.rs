//! The version-control collaborator used by the commit workflow.

pub mod hook;
pub mod repo;
pub mod staged;

use std::path::{Path, PathBuf};

pub use repo::GitRepository;
pub use staged::{LOCK_FILE_NAMES, StagedChanges, is_lock_file};

use crate::error::GitError;

/// Repository operations the workflow depends on.
///
/// All methods block; the workflow moves detection onto a blocking task.
pub trait VersionControl: Send + Sync {
    fn verify_tool_installed(&self) -> Result<(), GitError>;

    fn verify_inside_repository(&self) -> Result<(), GitError>;

    /// Stage modifications and deletions of already-tracked files.
    fn stage_all_tracked(&self) -> Result<(), GitError>;

    /// Staged file lists and diff text. Empty staging is `GitError::NothingStaged`.
    fn detect_staged_changes(&self) -> Result<StagedChanges, GitError>;

    fn pre_commit_hook_path(&self) -> Option<PathBuf>;

    fn has_pre_commit_hook(&self) -> bool {
        self.pre_commit_hook_path().is_some()
    }

    fn is_executable(&self, path: &Path) -> bool;

    fn run_pre_commit_hook(&self, path: &Path) -> Result<(), GitError>;

    /// Commit the index with `message`, returning git's summary output.
    fn commit(&self, message: &str) -> Result<String, GitError>;
}
