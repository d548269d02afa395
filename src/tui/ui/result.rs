//! Prediction result view.

use std::path::PathBuf;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::Assessment;
use crate::tui::styles::CardioTheme;

/// Outcome of the last report request on this screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Saved(PathBuf),
    Failed(String),
}

/// Result screen state
#[derive(Debug, Clone)]
pub struct ResultState {
    pub assessment: Assessment,
    pub report: Option<ReportStatus>,
}

impl ResultState {
    #[must_use]
    pub fn new(assessment: Assessment) -> Self {
        Self {
            assessment,
            report: None,
        }
    }
}

/// Render the result screen
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(7), // Model cards
            Constraint::Min(4),    // Recommendation
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0], state);
    render_model_cards(f, chunks[1], state);
    render_recommendation(f, chunks[2], state);
    render_result_footer(f, chunks[3], state);
}

fn render_result_header(f: &mut Frame, area: Rect, state: &ResultState) {
    let assessed_at = state
        .assessment
        .assessed_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S");

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CardioTheme::text()),
        Span::styled("Prediction Results", CardioTheme::title()),
        Span::styled(
            format!(" │ assessed {assessed_at}"),
            CardioTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_model_cards(f: &mut Frame, area: Rect, state: &ResultState) {
    let result = &state.assessment.result;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Logistic card: label plus probability gauge.
    let prob = result.logistic_probability.clamp(0.0, 1.0);
    let prob_style = CardioTheme::probability(prob);
    let block = Block::default()
        .title(Span::styled(" Logistic Regression ", CardioTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CardioTheme::border());
    let inner = block.inner(columns[0]);
    f.render_widget(block, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3)])
        .split(inner);

    let label = Paragraph::new(Line::from(Span::styled(
        result.logistic_label(),
        prob_style.add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(label, rows[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(CardioTheme::border()))
        .gauge_style(prob_style)
        .ratio(prob)
        .label(format!("Probability: {:.2}%", prob * 100.0));
    f.render_widget(gauge, rows[1]);

    // SVM card: label only, the model exposes no probability.
    let svm_style = CardioTheme::svm_sign(result.svm_sign);
    let svm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            result.svm_label(),
            svm_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("decision sign {:+}", result.svm_sign.as_i8()),
            CardioTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" SVM ", CardioTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(CardioTheme::border()),
    );
    f.render_widget(svm, columns[1]);
}

fn render_recommendation(f: &mut Frame, area: Rect, state: &ResultState) {
    let result = &state.assessment.result;
    let tier_style = CardioTheme::risk_tier(result.risk_tier);

    let content = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Risk tier: ", CardioTheme::text_secondary()),
            Span::styled(
                result.risk_tier.to_string(),
                tier_style.add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(result.advice, tier_style)),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Doctor Recommendation ", CardioTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(tier_style),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &ResultState) {
    let content = match &state.report {
        Some(ReportStatus::Saved(path)) => Line::from(vec![
            Span::styled("Report saved: ", CardioTheme::success()),
            Span::styled(path.display().to_string(), CardioTheme::text()),
        ]),
        Some(ReportStatus::Failed(message)) => Line::from(vec![
            Span::styled("! Report failed: ", CardioTheme::danger()),
            Span::styled(message.clone(), CardioTheme::danger()),
        ]),
        None => Line::from(vec![
            Span::styled("[R] ", CardioTheme::key_hint()),
            Span::styled("Save PDF Report ", CardioTheme::key_desc()),
            Span::styled("[N/Esc] ", CardioTheme::key_hint()),
            Span::styled("Back to Form ", CardioTheme::key_desc()),
            Span::styled("[Ctrl+Q] ", CardioTheme::key_hint()),
            Span::styled("Quit", CardioTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(footer, area);
}
