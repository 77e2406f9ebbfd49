//! Pure review state machine.
//!
//! Translates crossterm `KeyEvent`s into state changes and, once the user
//! settles on an option, a [`Decision`]. Nothing here touches the terminal,
//! so every transition is testable with synthetic key events.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Decision, MenuOption, ReviewMode};

/// Where the user is within one review prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Scrolling through the message.
    Viewing,
    /// Moving the cursor over the option menu.
    Selecting,
    /// Typing a clue.
    Inputting,
}

/// State of a single review prompt.
#[derive(Debug, Clone)]
pub struct ReviewModel {
    message: String,
    mode: ReviewMode,
    stage: Stage,
    scroll: u16,
    viewport_height: u16,
    cursor: usize,
    input: String,
    /// Cursor position in `input`, in chars.
    input_cursor: usize,
}

impl ReviewModel {
    pub fn new(message: impl Into<String>, mode: ReviewMode) -> Self {
        Self {
            message: message.into(),
            mode,
            stage: Stage::Viewing,
            scroll: 0,
            viewport_height: 0,
            cursor: 0,
            input: String::new(),
            input_cursor: 0,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn mode(&self) -> ReviewMode {
        self.mode
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_cursor(&self) -> usize {
        self.input_cursor
    }

    pub fn options(&self) -> &'static [MenuOption] {
        self.mode.options()
    }

    /// Number of message lines visible at once; bounds scrolling.
    pub fn set_viewport_height(&mut self, height: u16) {
        self.viewport_height = height;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn line_count(&self) -> u16 {
        u16::try_from(self.message.lines().count()).unwrap_or(u16::MAX)
    }

    fn max_scroll(&self) -> u16 {
        self.line_count().saturating_sub(self.viewport_height.max(1))
    }

    /// Apply one key event. Returns `Some` exactly when the prompt is over.
    pub fn update(&mut self, key: KeyEvent) -> Option<Decision> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Decision::Cancel);
        }

        match self.stage {
            Stage::Viewing => self.handle_viewing(key),
            Stage::Selecting => self.handle_selecting(key),
            Stage::Inputting => self.handle_inputting(key),
        }
    }

    fn handle_viewing(&mut self, key: KeyEvent) -> Option<Decision> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1).min(self.max_scroll());
            }
            KeyCode::Tab | KeyCode::Enter => self.stage = Stage::Selecting,
            _ => {}
        }
        None
    }

    fn handle_selecting(&mut self, key: KeyEvent) -> Option<Decision> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1).min(self.options().len() - 1);
            }
            KeyCode::Tab => self.stage = Stage::Viewing,
            KeyCode::Enter => return self.pick(),
            _ => {}
        }
        None
    }

    fn pick(&mut self) -> Option<Decision> {
        match self.options()[self.cursor] {
            MenuOption::Confirm => Some(Decision::Confirm),
            MenuOption::Regenerate => Some(Decision::Regenerate),
            MenuOption::Edit => Some(Decision::Edit),
            MenuOption::Cancel => Some(Decision::Cancel),
            MenuOption::Clue => {
                self.stage = Stage::Inputting;
                self.input.clear();
                self.input_cursor = 0;
                None
            }
        }
    }

    fn handle_inputting(&mut self, key: KeyEvent) -> Option<Decision> {
        match key.code {
            KeyCode::Esc => self.stage = Stage::Selecting,
            KeyCode::Enter => return Some(Decision::RequestClue(self.input.clone())),
            KeyCode::Backspace if self.input_cursor > 0 => {
                self.input_cursor -= 1;
                let at = self.byte_offset(self.input_cursor);
                self.input.remove(at);
            }
            KeyCode::Left => self.input_cursor = self.input_cursor.saturating_sub(1),
            KeyCode::Right => {
                self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = self.byte_offset(self.input_cursor);
                self.input.insert(at, c);
                self.input_cursor += 1;
            }
            _ => {}
        }
        None
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map_or(self.input.len(), |(i, _)| i)
    }
}
