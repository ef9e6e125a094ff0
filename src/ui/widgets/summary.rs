// src/ui/widgets/summary.rs

use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::app::{App, AppState};
use crate::core::models::{CategoryGrade, ScanResult};
use crate::ui::grade_color;

/// Renders the summary widget: overall grade and score, per-category grades,
/// compliance scores and the key signals collected by the probes.
///
/// Only renders content once the scan has finished.
///
/// # Arguments
/// * `frame` - The `Frame` used for rendering the UI.
/// * `app` - The application state holding the scan result.
/// * `area` - The `Rect` defining the drawable area for this widget.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Grade & score
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(8), // Category grades
            Constraint::Length(4), // Compliance
            Constraint::Min(0),    // Signals
        ])
        .split(area);

    let result = match (&app.state, &app.scan_result) {
        (AppState::Finished, Some(result)) => result,
        _ => return,
    };

    // --- Grade & Score ---
    let grade_style = Style::default().fg(grade_color(result.grade)).bold();
    let score_text = Text::from(vec![
        Line::from(vec![Span::raw("Grade "), Span::styled(result.grade.to_string(), grade_style)]),
        Line::from(format!("{}/100  {}", result.score, result.domain)),
    ]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), chunks[0]);

    let score_gauge = Gauge::default()
        .percent(result.score.min(100) as u16)
        .label("")
        .style(Style::default().fg(grade_color(result.grade)));
    frame.render_widget(score_gauge, chunks[1]);

    // --- Category Grades ---
    let category_lines: Vec<Line> = result
        .category_grades
        .iter()
        .map(|(category, grade)| {
            let style = match grade {
                CategoryGrade::Graded(g) => Style::default().fg(grade_color(*g)),
                CategoryGrade::NotApplicable => Style::default().fg(Color::DarkGray),
            };
            Line::from(vec![
                Span::raw(format!("{:<17}", category.to_string())),
                Span::styled(grade.to_string(), style),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(category_lines).block(Block::default().title("CATEGORIES".bold())),
        chunks[3],
    );

    // --- Compliance ---
    let scores = result.compliance_scores;
    let compliance_lines = vec![
        Line::from(format!("ISO 27001  {}%", scores.iso)),
        Line::from(format!("NIST CSF   {}%", scores.nist)),
        Line::from(format!("GDPR       {}%", scores.gdpr)),
    ];
    frame.render_widget(
        Paragraph::new(compliance_lines).block(Block::default().title("COMPLIANCE".bold())),
        chunks[4],
    );

    frame.render_widget(
        Paragraph::new(signal_lines(result))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("SIGNALS".bold())),
        chunks[5],
    );
}

fn check(label: &str, passed: bool) -> Line<'static> {
    let (icon, style) = if passed {
        ("✓", Style::default().fg(Color::Green))
    } else {
        ("✗", Style::default().fg(Color::Red))
    };
    Line::from(vec![Span::styled(format!("{} ", icon), style), Span::raw(label.to_string())])
}

fn signal_lines(result: &ScanResult) -> Vec<Line<'static>> {
    let privacy = &result.compliance.privacy;
    let resilience = &result.compliance.resilience;
    let mut lines = vec![
        Line::from(format!("TLS: {}", result.tls.version)),
        Line::from(format!(
            "Registrar: {} ({}, {} yrs)",
            result.identity.registrar, result.identity.country, result.identity.age
        )),
        Line::from(format!("WAF: {}", resilience.waf.as_deref().unwrap_or("None"))),
        check("DMARC", result.email_security.dmarc != "Missing"),
        check("DNSSEC", resilience.dnssec),
        check("security.txt", result.security_txt),
        check("Privacy policy", privacy.privacy_policy),
        check("Cookie banner", privacy.cookie_banner),
    ];
    if !privacy.trust_badges.is_empty() {
        lines.push(Line::from(format!("Badges: {}", privacy.trust_badges.join(", "))));
    }
    let tech: Vec<&str> = result.technologies.iter().map(|t| t.name.as_str()).collect();
    lines.push(Line::from(format!(
        "Tech: {}",
        if tech.is_empty() { "Not identified".to_string() } else { tech.join(", ") }
    )));
    lines.push(Line::from(format!("Subdomains: {}", result.subdomains.len())));
    lines
}
