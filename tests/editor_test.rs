//! Integration tests for the external editor and edit session.
//!
//! Note: These tests modify the PATH environment variable and must run serially
//! to avoid race conditions.

#![cfg(unix)]

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use cluecommit::error::EditorError;
use cluecommit::{Decision, EditExit, EditSession, Editor, ExternalEditor, ReviewMode, Reviewer};
use serial_test::serial;

struct ConfirmingReviewer {
    shown: Vec<String>,
}

impl Reviewer for ConfirmingReviewer {
    fn review(&mut self, message: &str, mode: ReviewMode) -> Decision {
        assert_eq!(mode, ReviewMode::PostEdit);
        self.shown.push(message.to_string());
        Decision::Confirm
    }
}

/// Put an executable script named `name` in `dir`.
fn install_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

/// Run `f` with `bin` prepended to PATH, restoring PATH afterwards.
fn with_path_prefix<T>(bin: &Path, f: impl FnOnce() -> T) -> T {
    let old_path = env::var("PATH").unwrap_or_default();
    unsafe {
        env::set_var("PATH", format!("{}:{}", bin.display(), old_path));
    }
    let result = f();
    unsafe {
        env::set_var("PATH", old_path);
    }
    result
}

#[test]
#[serial]
fn test_session_reads_back_text_written_by_editor() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).unwrap();
    // Writes to its last argument, ignoring flags before it
    install_script(
        &bin,
        "fake-editor",
        "#!/bin/sh\nfor last; do :; done\nprintf 'docs: edited by script\\n' > \"$last\"\n",
    );
    let scratch = tempfile::tempdir().unwrap();

    let editor = ExternalEditor::new("fake-editor --wait");
    let mut reviewer = ConfirmingReviewer { shown: Vec::new() };
    let exit = with_path_prefix(&bin, || {
        EditSession::new("docs: generated", &editor, &mut reviewer)
            .with_temp_dir(scratch.path())
            .run()
    })
    .unwrap();

    assert_eq!(exit, EditExit::Commit("docs: edited by script\n".to_string()));
    assert_eq!(reviewer.shown, vec!["docs: edited by script\n".to_string()]);
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
#[serial]
fn test_editor_sees_original_message() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).unwrap();
    let copy = dir.path().join("seen.txt");
    install_script(
        &bin,
        "copy-editor",
        &format!("#!/bin/sh\ncp \"$1\" '{}'\n", copy.display()),
    );
    let scratch = tempfile::tempdir().unwrap();

    let editor = ExternalEditor::new("copy-editor");
    let mut reviewer = ConfirmingReviewer { shown: Vec::new() };
    let exit = with_path_prefix(&bin, || {
        EditSession::new("fix: keep me", &editor, &mut reviewer)
            .with_temp_dir(scratch.path())
            .run()
    })
    .unwrap();

    assert_eq!(fs::read_to_string(&copy).unwrap(), "fix: keep me");
    assert_eq!(exit, EditExit::Commit("fix: keep me".to_string()));
}

#[test]
#[serial]
fn test_failing_editor_cleans_up_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).unwrap();
    install_script(&bin, "crashing-editor", "#!/bin/sh\nexit 7\n");
    let scratch = tempfile::tempdir().unwrap();

    let editor = ExternalEditor::new("crashing-editor");
    let mut reviewer = ConfirmingReviewer { shown: Vec::new() };
    let result = with_path_prefix(&bin, || {
        EditSession::new("fix: x", &editor, &mut reviewer)
            .with_temp_dir(scratch.path())
            .run()
    });

    assert!(matches!(
        result,
        Err(EditorError::NonZeroExit { code: Some(7), .. })
    ));
    assert!(reviewer.shown.is_empty());
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
#[serial]
fn test_editor_missing_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let empty_bin = dir.path().join("bin");
    fs::create_dir(&empty_bin).unwrap();

    let old_path = env::var("PATH").unwrap_or_default();
    unsafe {
        env::set_var("PATH", empty_bin.display().to_string());
    }
    let result = ExternalEditor::new("nvim").edit(&dir.path().join("msg"));
    unsafe {
        env::set_var("PATH", old_path);
    }

    assert!(matches!(result, Err(EditorError::NotFound(ref p)) if p == "nvim"));
}
