//! Staged change detection using git2.

use std::path::Path;

use git2::{Delta, Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::error::GitError;

/// Maximum characters for the unified diff text before truncation.
const MAX_DIFF_LENGTH: usize = 30_000;

/// Lock and sum files that never reach the model.
pub const LOCK_FILE_NAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "Gemfile.lock",
    "Cargo.lock",
    "go.sum",
    "composer.lock",
    "poetry.lock",
    "Pipfile.lock",
    "pnpm-lock.yaml",
];

/// What is currently staged for the next commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedChanges {
    /// Added, modified, renamed, copied, or type-changed paths.
    pub modified_files: Vec<String>,
    pub deleted_files: Vec<String>,
    /// Unified diff of `modified_files` only.
    pub diff_text: String,
    pub truncated: bool,
}

impl StagedChanges {
    pub fn total_files(&self) -> usize {
        self.modified_files.len() + self.deleted_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_files() == 0
    }
}

/// Whether a path names a lock file, at any depth.
pub fn is_lock_file(path: &str) -> bool {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| LOCK_FILE_NAMES.contains(&name))
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DetectionFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DetectionFailed)?;
    Ok(Some(tree))
}

/// Collect the staged (HEAD vs index) changes, minus lock files.
///
/// Returns `GitError::NothingStaged` when no non-lock file is staged.
pub fn detect_staged(repo: &Repository) -> Result<StagedChanges, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut opts = DiffOptions::new();
    opts.minimal(true);
    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
        .map_err(GitError::DetectionFailed)?;

    let mut changes = StagedChanges::default();
    collect_files(&diff, &mut changes);

    if changes.is_empty() {
        return Err(GitError::NothingStaged);
    }

    append_diff_text(&diff, &mut changes);
    debug!(
        "Detected {} modified and {} deleted files ({} diff chars, truncated={})",
        changes.modified_files.len(),
        changes.deleted_files.len(),
        changes.diff_text.len(),
        changes.truncated
    );

    Ok(changes)
}

/// Path of a delta, preferring the new side.
fn delta_path(delta: &git2::DiffDelta<'_>) -> Option<String> {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().to_string())
}

fn collect_files(diff: &Diff<'_>, changes: &mut StagedChanges) {
    for delta in diff.deltas() {
        let Some(path) = delta_path(&delta) else {
            continue;
        };
        if path.is_empty() || is_lock_file(&path) {
            continue;
        }

        match delta.status() {
            Delta::Deleted => changes.deleted_files.push(path),
            Delta::Added
            | Delta::Modified
            | Delta::Renamed
            | Delta::Copied
            | Delta::Typechange => changes.modified_files.push(path),
            _ => {}
        }
    }
}

/// Append unified diff text for non-deleted, non-lock files, respecting the max length.
fn append_diff_text(diff: &Diff<'_>, changes: &mut StagedChanges) {
    let text = &mut changes.diff_text;
    let truncated = &mut changes.truncated;

    let result = diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        if *truncated {
            return true;
        }
        if delta.status() == Delta::Deleted
            || delta_path(&delta).is_some_and(|p| is_lock_file(&p))
        {
            return true;
        }

        let content = String::from_utf8_lossy(line.content());
        let origin = line.origin();

        if text.len() + content.len() + 1 > MAX_DIFF_LENGTH {
            *truncated = true;
            return true;
        }

        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&content);

        true
    });

    if let Err(e) = result {
        warn!("Failed to collect diff text: {e}");
        changes.truncated = true;
    }
}
