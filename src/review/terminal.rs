//! Terminal lifecycle for the review prompt.
//!
//! The prompt renders to stderr so stdout stays clean for the commit summary.
//! Raw mode and the alternate screen are restored on every exit path,
//! including panics.

use std::io::{BufWriter, Stderr, stderr};
use std::panic;
use std::sync::Once;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::warn;

use super::render::{message_viewport_height, render};
use super::state::ReviewModel;
use super::{Decision, ReviewMode, Reviewer};

type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

static PANIC_HOOK: Once = Once::new();

fn init_tui() -> std::io::Result<Tui> {
    let mut out = BufWriter::new(stderr());
    enable_raw_mode()?;
    execute!(out, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(out))
}

/// Leave the alternate screen and raw mode. Safe to call more than once.
fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stderr(), LeaveAlternateScreen)?;
    Ok(())
}

/// Chain a hook that restores the terminal before the panic message prints.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_tui();
            original_hook(panic_info);
        }));
    });
}

/// [`Reviewer`] that runs the prompt on the controlling terminal.
///
/// Any terminal or input error ends the prompt with [`Decision::Cancel`].
#[derive(Debug)]
pub struct TerminalReviewer;

impl TerminalReviewer {
    pub fn new() -> Self {
        install_panic_hook();
        Self
    }
}

impl Default for TerminalReviewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reviewer for TerminalReviewer {
    fn review(&mut self, message: &str, mode: ReviewMode) -> Decision {
        decision_or_cancel(run_prompt(ReviewModel::new(message, mode)))
    }
}

/// A prompt that fails to render or read input counts as a cancel.
fn decision_or_cancel(result: std::io::Result<Decision>) -> Decision {
    match result {
        Ok(decision) => decision,
        Err(e) => {
            warn!("Review prompt failed, cancelling: {e}");
            Decision::Cancel
        }
    }
}

fn run_prompt(model: ReviewModel) -> std::io::Result<Decision> {
    let mut terminal = match init_tui() {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = restore_tui();
            return Err(e);
        }
    };

    let result = event_loop(&mut terminal, model);

    if let Err(e) = restore_tui() {
        warn!("Failed to restore terminal: {e}");
    }
    let _ = terminal.show_cursor();

    result
}

fn event_loop(terminal: &mut Tui, mut model: ReviewModel) -> std::io::Result<Decision> {
    loop {
        terminal.draw(|frame| {
            let height = message_viewport_height(frame.area(), &model);
            model.set_viewport_height(height);
            render(frame, &model);
        })?;

        if let Event::Key(key) = event::read()?
            && let Some(decision) = model.update(key)
        {
            return Ok(decision);
        }
    }
}
