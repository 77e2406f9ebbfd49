//! Pre-commit hook discovery and execution.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::Repository;
use tracing::debug;

use crate::error::GitError;

const PRE_COMMIT: &str = "pre-commit";

/// Directory git runs hooks from, honouring `core.hooksPath`.
///
/// A relative `core.hooksPath` is resolved against the work tree root, the
/// same way git resolves it when running hooks in a non-bare repository.
pub fn hooks_dir(repo: &Repository) -> PathBuf {
    let configured = repo
        .config()
        .and_then(|c| c.get_path("core.hooksPath"))
        .ok();

    match configured {
        Some(path) if path.is_absolute() => path,
        Some(path) => repo.workdir().unwrap_or_else(|| repo.path()).join(path),
        None => repo.path().join("hooks"),
    }
}

/// Path of the pre-commit hook if a file exists there.
pub fn pre_commit_hook(repo: &Repository) -> Option<PathBuf> {
    let path = hooks_dir(repo).join(PRE_COMMIT);
    path.is_file().then_some(path)
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run the hook from `workdir`, streaming its output to the terminal.
pub fn run_hook(path: &Path, workdir: &Path) -> Result<(), GitError> {
    debug!("Running pre-commit hook {}", path.display());

    let status = Command::new(path)
        .current_dir(workdir)
        .status()
        .map_err(|source| GitError::HookSpawnFailed {
            path: path.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(GitError::HookFailed {
            code: status.code(),
        });
    }

    Ok(())
}
