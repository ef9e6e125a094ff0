// src/ui/widgets/footer.rs

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, AppState};

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = |label: &'static str| Span::styled(label, Style::new().bold().fg(Color::Yellow));
    let spans = match app.state {
        AppState::Idle => Line::from(vec![
            Span::raw("Press "),
            key("Enter"),
            Span::raw(" to scan, "),
            key("Esc"),
            Span::raw(" to quit."),
        ]),
        AppState::Finished => Line::from(vec![
            key("[↑↓]"),
            Span::raw(" Browse findings, "),
            key("[N]"),
            Span::raw("ew Scan, "),
            key("[Q]"),
            Span::raw("uit"),
        ]),
        AppState::Scanning => Line::from("Scanning... Press Q to quit."),
    };

    let footer = Paragraph::new(spans).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
