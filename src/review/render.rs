//! Drawing a [`ReviewModel`] with ratatui.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use super::state::{ReviewModel, Stage};

const HEADER: &str = "Generated Commit Message:";

/// Screen areas for one frame: header, message box, hint line, and the menu
/// or clue input below it.
pub fn layout(area: Rect, model: &ReviewModel) -> [Rect; 4] {
    let bottom_height = match model.stage() {
        Stage::Inputting => 3,
        Stage::Viewing | Stage::Selecting => {
            u16::try_from(model.options().len()).unwrap_or(u16::MAX)
        }
    };

    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(bottom_height),
    ])
    .areas(area)
}

/// Visible message rows for a terminal of `area`, inside the border.
pub fn message_viewport_height(area: Rect, model: &ReviewModel) -> u16 {
    layout(area, model)[1].height.saturating_sub(2)
}

pub fn render(frame: &mut Frame, model: &ReviewModel) {
    let [header, message, hint, bottom] = layout(frame.area(), model);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            HEADER,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))),
        header,
    );

    let border_style = if model.stage() == Stage::Viewing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(model.message())
            .block(Block::bordered().border_style(border_style))
            .scroll((model.scroll(), 0)),
        message,
    );

    frame.render_widget(
        Paragraph::new(hint_text(model.stage())).style(Style::default().fg(Color::DarkGray)),
        hint,
    );

    match model.stage() {
        Stage::Inputting => render_input(frame, bottom, model),
        Stage::Viewing | Stage::Selecting => render_menu(frame, bottom, model),
    }
}

fn hint_text(stage: Stage) -> &'static str {
    match stage {
        Stage::Viewing => "↑/k ↓/j scroll, Tab/Enter to choose an action, Ctrl+C to cancel",
        Stage::Selecting => "↑/k ↓/j move, Enter to select, Tab to scroll the message",
        Stage::Inputting => "Type a clue, Enter to regenerate with it, Esc to go back",
    }
}

fn render_menu(frame: &mut Frame, area: Rect, model: &ReviewModel) {
    let selecting = model.stage() == Stage::Selecting;
    let lines: Vec<Line> = model
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let label = option.label(model.mode());
            if selecting && i == model.cursor() {
                Line::from(Span::styled(
                    format!("> {label}"),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {label}"))
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_input(frame: &mut Frame, area: Rect, model: &ReviewModel) {
    frame.render_widget(
        Paragraph::new(model.input()).block(
            Block::bordered()
                .title(" Clue ")
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );

    let offset = u16::try_from(model.input_cursor()).unwrap_or(u16::MAX);
    let max_x = area.right().saturating_sub(2);
    frame.set_cursor_position(Position::new(
        area.x.saturating_add(1).saturating_add(offset).min(max_x),
        area.y + 1,
    ));
}
