//! Hand-editing a generated message in an external editor.

pub mod editor;

use std::fs;
use std::path::PathBuf;

use tracing::debug;

pub use editor::{Editor, ExternalEditor, resolve_editor_command};

use crate::error::EditorError;
use crate::review::{Decision, ReviewMode, Reviewer};

const TEMP_FILE_PREFIX: &str = "COMMIT_EDITMSG";

/// How an edit session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditExit {
    /// Commit the edited text.
    Commit(String),
    /// Drop the edits and generate a new message.
    Regenerate,
    /// Drop the edits and generate a new message with this clue.
    Clue(String),
    Cancel,
}

/// Edit, review, and repeat until the user leaves the loop.
///
/// Each pass writes the current text to a fresh temporary file, which is
/// removed before the pass returns whether or not the editor succeeded.
pub struct EditSession<'a, E: ?Sized, R: ?Sized> {
    editor: &'a E,
    reviewer: &'a mut R,
    message: String,
    temp_dir: Option<PathBuf>,
}

impl<'a, E, R> EditSession<'a, E, R>
where
    E: Editor + ?Sized,
    R: Reviewer + ?Sized,
{
    pub fn new(message: impl Into<String>, editor: &'a E, reviewer: &'a mut R) -> Self {
        Self {
            message: message.into(),
            editor,
            reviewer,
            temp_dir: None,
        }
    }

    /// Create temporary files in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn run(mut self) -> Result<EditExit, EditorError> {
        loop {
            self.message = self.edit_once()?;

            match self.reviewer.review(&self.message, ReviewMode::PostEdit) {
                Decision::Confirm => return Ok(EditExit::Commit(self.message)),
                Decision::Edit => debug!("Editing message again"),
                Decision::Regenerate => return Ok(EditExit::Regenerate),
                Decision::RequestClue(clue) => return Ok(EditExit::Clue(clue)),
                Decision::Cancel => return Ok(EditExit::Cancel),
            }
        }
    }

    /// One editor round trip through a temporary file.
    fn edit_once(&self) -> Result<String, EditorError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_FILE_PREFIX);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(EditorError::TempFile)?;

        // Close our handle so the editor is the only writer; the path is
        // still removed when dropped.
        let path = file.into_temp_path();
        fs::write(&path, &self.message).map_err(EditorError::TempFile)?;

        self.editor.edit(&path)?;

        let edited = fs::read_to_string(&path).map_err(EditorError::ReadBack)?;
        path.close().map_err(EditorError::TempFile)?;
        Ok(edited)
    }
}
