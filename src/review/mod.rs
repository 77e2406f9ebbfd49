//! Interactive review of a generated commit message.
//!
//! [`ReviewModel`] is the pure state machine: it takes key events and
//! eventually yields a [`Decision`]. [`render`] draws a model, and
//! [`TerminalReviewer`] wires both to a real terminal.

pub mod render;
pub mod state;
pub mod terminal;

pub use render::render;
pub use state::{ReviewModel, Stage};
pub use terminal::TerminalReviewer;

/// Outcome of one review prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Regenerate,
    /// Typed clue text, possibly empty. Callers treat blank text as no clue.
    RequestClue(String),
    /// Open the editor. In post-edit mode this means "edit again".
    Edit,
    Cancel,
}

/// Which option set the prompt offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewMode {
    #[default]
    PreEdit,
    /// Shown after the message came back from the editor.
    PostEdit,
}

/// One entry in the option menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Confirm,
    Regenerate,
    Clue,
    Edit,
    Cancel,
}

const PRE_EDIT_OPTIONS: &[MenuOption] = &[
    MenuOption::Confirm,
    MenuOption::Regenerate,
    MenuOption::Clue,
    MenuOption::Edit,
    MenuOption::Cancel,
];

const POST_EDIT_OPTIONS: &[MenuOption] = &[
    MenuOption::Confirm,
    MenuOption::Edit,
    MenuOption::Regenerate,
    MenuOption::Clue,
    MenuOption::Cancel,
];

impl ReviewMode {
    pub fn options(self) -> &'static [MenuOption] {
        match self {
            ReviewMode::PreEdit => PRE_EDIT_OPTIONS,
            ReviewMode::PostEdit => POST_EDIT_OPTIONS,
        }
    }
}

impl MenuOption {
    pub fn label(self, mode: ReviewMode) -> &'static str {
        match (self, mode) {
            (MenuOption::Confirm, _) => "Yes",
            (MenuOption::Regenerate, _) => "Regenerate",
            (MenuOption::Clue, _) => "Add Clue",
            (MenuOption::Edit, ReviewMode::PreEdit) => "Edit",
            (MenuOption::Edit, ReviewMode::PostEdit) => "Edit Again",
            (MenuOption::Cancel, _) => "Cancel",
        }
    }
}

/// Presents a message and blocks until the user decides what to do with it.
pub trait Reviewer: Send {
    fn review(&mut self, message: &str, mode: ReviewMode) -> Decision;
}
