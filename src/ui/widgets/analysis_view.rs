// src/ui/widgets/analysis_view.rs

use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, AppState};
use crate::core::models::Finding;
use crate::ui::severity_color;

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Findings (Navigate with ↑ ↓)");

    if app.state != AppState::Finished {
        let content = match app.state {
            AppState::Scanning => Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", app.spinner()), Style::default().fg(Color::Cyan)),
                Span::raw("Scanning... Please wait."),
            ])),
            _ => Paragraph::new("Scan results will appear here..."),
        };
        frame.render_widget(content.alignment(Alignment::Center).block(main_block), area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(0)])
        .split(inner_area);

    let items: Vec<ListItem> = app
        .findings()
        .iter()
        .map(|f| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", f.category), Style::default().fg(Color::DarkGray)),
                Span::styled(f.title.clone(), Style::default().fg(severity_color(f.severity))),
                Span::styled(format!("  {}", f.severity), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let findings_list = List::new(items)
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, chunks[0], &mut app.findings_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let text = match app.selected_finding() {
        Some(finding) => finding_details(finding),
        None => verdict(app),
    };
    let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block);
    frame.render_widget(p, chunks[1]);
}

fn finding_details(finding: &Finding) -> Text<'static> {
    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::Yellow).bold());
    Text::from(vec![
        Line::from(""),
        Line::from(vec![label("CATEGORY: "), Span::raw(finding.category.to_string())]),
        Line::from(vec![
            label("COMPLIANCE: "),
            Span::raw(format!(
                "ISO 27001 {} | NIST CSF {} | MITRE {}",
                finding.compliance.iso, finding.compliance.nist, finding.compliance.mitre
            )),
        ]),
        Line::from(""),
        Line::from(label("WHAT IT IS:")),
        Line::from(finding.description.clone()),
    ])
}

/// Shown when there is nothing to select: the plain-language summary.
fn verdict(app: &App) -> Text<'static> {
    let summary = app
        .scan_result
        .as_ref()
        .map(|r| r.summary.clone())
        .unwrap_or_default();
    Text::from(vec![
        Line::from(""),
        Line::from("✓ NO FINDINGS".bold().fg(Color::Green)),
        Line::from(""),
        Line::from(summary),
    ])
}
