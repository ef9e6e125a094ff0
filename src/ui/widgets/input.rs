// src/ui/widgets/input.rs

use ratatui::{prelude::*, widgets::{Block, Borders, Paragraph}};

use crate::app::{App, AppState};

/// Renders the input box widget.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_block = Block::default().borders(Borders::ALL).title("Target Domain");
    let input_paragraph = Paragraph::new(app.input.as_str())
        .block(input_block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, area);

    // The cursor is only shown while typing.
    if app.state == AppState::Idle {
        frame.set_cursor_position((area.x + app.input.chars().count() as u16 + 1, area.y + 1));
    }
}
