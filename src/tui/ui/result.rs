//! Result panel shown next to the form.

use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Assessment, RiskLabel, DISCLAIMER};
use crate::tui::styles::MedicalTheme;

/// What the panel currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultPanel {
    /// Nothing submitted yet
    #[default]
    Empty,
    /// Last submission succeeded
    Assessed(Assessment),
    /// Last submission failed; the form stays usable
    Failed(String),
}

/// Render the result panel
pub fn render_result(f: &mut Frame, area: Rect, panel: &ResultPanel) {
    match panel {
        ResultPanel::Empty => render_empty(f, area),
        ResultPanel::Assessed(assessment) => render_assessment(f, area, assessment),
        ResultPanel::Failed(message) => render_failure(f, area, message),
    }
}

fn render_empty(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(Span::styled("Instructions", MedicalTheme::subtitle())),
        Line::from(Span::styled(
            "Please fill in all the patient information. All fields are required \
             for an accurate prediction.",
            MedicalTheme::text_secondary(),
        )),
        Line::from(Span::styled(
            "Press Enter to analyze heart disease risk.",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Prediction Results ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

const PROBABILITY_PREFIX: &str = "Risk Probability: ";
const NOTE_PREFIX: &str = "Important Note: ";

/// Rows the template needs without spacer lines, rounded up.
fn dense_height(label: RiskLabel, width: u16) -> usize {
    let width = usize::from(width.max(1));
    let wrapped = |len: usize| {
        if len <= width {
            1
        } else {
            len.div_ceil(width) + 1
        }
    };

    [
        label.headline().len() + 3,
        label.summary().len(),
        PROBABILITY_PREFIX.len() + 6,
        label.advice().len(),
        NOTE_PREFIX.len() + DISCLAIMER.len(),
    ]
    .into_iter()
    .map(wrapped)
    .sum()
}

/// Lines of the template selected by the label.
fn template_lines(assessment: &Assessment, spaced: bool) -> Vec<Line<'static>> {
    let label = assessment.label;
    let style = MedicalTheme::risk_label(label);
    let icon = match label {
        RiskLabel::Low => "OK",
        RiskLabel::High => "!",
    };

    let blocks = [
        Line::from(Span::styled(
            format!("{} {}", icon, label.headline()),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(label.summary(), MedicalTheme::text())),
        Line::from(vec![
            Span::styled(PROBABILITY_PREFIX, MedicalTheme::text_secondary()),
            Span::styled(
                assessment.probability_percent(),
                style.add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(label.advice(), MedicalTheme::text())),
        Line::from(vec![
            Span::styled(NOTE_PREFIX, MedicalTheme::text_secondary()),
            Span::styled(DISCLAIMER, MedicalTheme::text_muted()),
        ]),
    ];

    let mut lines = Vec::new();
    for (i, line) in blocks.into_iter().enumerate() {
        if spaced && i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(line);
    }
    lines
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let style = MedicalTheme::risk_label(assessment.label);

    let block = Block::default()
        .title(Span::styled(" Prediction Results ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(style);

    // Spacers only when every line still fits.
    let inner = block.inner(area);
    let spaced = dense_height(assessment.label, inner.width) + 4 <= usize::from(inner.height);

    let content = Paragraph::new(template_lines(assessment, spaced))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(content, area);
}

fn render_failure(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(
            format!("Error making prediction: {message}"),
            MedicalTheme::text(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Adjust the inputs and press Enter to retry",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Prediction Results ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}
