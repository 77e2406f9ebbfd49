//! Launching the user's text editor.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::EditorSettings;
use crate::error::EditorError;

const FALLBACK_EDITOR: &str = "vi";

/// Edits a file in place, blocking until the user is done.
pub trait Editor: Send + Sync {
    fn edit(&self, path: &Path) -> Result<(), EditorError>;
}

/// Pick the editor command: config, then `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn resolve_editor_command(configured: Option<&str>) -> String {
    let from_env = |name: &str| std::env::var(name).ok();

    [
        configured.map(str::to_string),
        from_env("VISUAL"),
        from_env("EDITOR"),
    ]
    .into_iter()
    .flatten()
    .find(|cmd| !cmd.trim().is_empty())
    .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// An editor run as a child process attached to the terminal.
///
/// The command may include arguments (`code --wait`); the file path is
/// appended last. Arguments are split on whitespace without shell quoting.
/// When the first word is not a program, the whole command is tried as a
/// path so `/Applications/Sublime Text.app/Contents/SharedSupport/bin/subl`
/// still resolves, though it then takes no arguments.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self::new(resolve_editor_command(settings.command.as_deref()))
    }
}

impl ExternalEditor {
    /// Program name, resolved path, and arguments.
    fn resolve(&self) -> Result<(&str, PathBuf, Vec<&str>), EditorError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(EditorError::EmptyCommand)?;

        if let Ok(resolved) = which::which(program) {
            return Ok((program, resolved, parts.collect()));
        }

        let whole = self.command.trim();
        match which::which(whole) {
            Ok(resolved) if whole != program => Ok((whole, resolved, Vec::new())),
            _ => Err(EditorError::NotFound(program.to_string())),
        }
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        let (program, resolved, args) = self.resolve()?;

        debug!("Opening {} with {}", path.display(), resolved.display());

        let mut cmd = Command::new(&resolved);
        cmd.args(args).arg(path);
        if let Some(dir) = path.parent() {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|source| EditorError::SpawnFailed {
            program: program.to_string(),
            source,
        })?;

        if !status.success() {
            return Err(EditorError::NonZeroExit {
                program: program.to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_command_wins() {
        temp_env::with_vars(
            [("VISUAL", Some("nano")), ("EDITOR", Some("emacs"))],
            || {
                assert_eq!(resolve_editor_command(Some("nvim")), "nvim");
            },
        );
    }

    #[test]
    fn test_visual_before_editor() {
        temp_env::with_vars(
            [("VISUAL", Some("nano")), ("EDITOR", Some("emacs"))],
            || {
                assert_eq!(resolve_editor_command(None), "nano");
            },
        );
    }

    #[test]
    fn test_blank_values_are_skipped() {
        temp_env::with_vars([("VISUAL", Some("  ")), ("EDITOR", Some("emacs"))], || {
            assert_eq!(resolve_editor_command(Some("")), "emacs");
        });
    }

    #[test]
    fn test_falls_back_to_vi() {
        temp_env::with_vars_unset(["VISUAL", "EDITOR"], || {
            assert_eq!(resolve_editor_command(None), "vi");
        });
    }

    #[test]
    fn test_empty_command_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExternalEditor::new("   ").edit(&dir.path().join("msg"));
        assert!(matches!(result, Err(EditorError::EmptyCommand)));
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExternalEditor::new("definitely-not-an-editor-xyz --wait")
            .edit(&dir.path().join("msg"));
        match result {
            Err(EditorError::NotFound(program)) => {
                assert_eq!(program, "definitely-not-an-editor-xyz");
            }
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_editor_runs_with_file_argument() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msg");
        std::fs::write(&path, "before").unwrap();

        // `true` ignores its arguments and exits 0
        assert!(ExternalEditor::new("true").edit(&path).is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "before");
    }

    #[cfg(unix)]
    #[test]
    fn test_program_path_with_spaces() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("Sublime Text.app");
        std::fs::create_dir(&app).unwrap();
        let program = app.join("subl");
        std::fs::write(&program, "#!/bin/sh\nprintf 'feat: edited' > \"$1\"\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let path = dir.path().join("msg");
        std::fs::write(&path, "before").unwrap();

        ExternalEditor::new(program.display().to_string())
            .edit(&path)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "feat: edited");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_editor_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExternalEditor::new("false").edit(&dir.path().join("msg"));
        assert!(matches!(
            result,
            Err(EditorError::NonZeroExit { code: Some(1), .. })
        ));
    }
}
