//! UI module: View components for the TUI.

pub mod form;
pub mod result;
pub mod startup;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::styles::MedicalTheme;

pub fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Heart Disease Risk Prediction", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(
            "Enter patient information to assess risk",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

/// Key hints plus the current form notice, if any.
pub fn render_key_hints(f: &mut Frame, area: Rect, notice: Option<&str>) {
    let mut lines = vec![Line::from(vec![
        Span::styled("[↑↓] ", MedicalTheme::key_hint()),
        Span::styled("Move ", MedicalTheme::key_desc()),
        Span::styled("[0-9] ", MedicalTheme::key_hint()),
        Span::styled("Type ", MedicalTheme::key_desc()),
        Span::styled("[+-] ", MedicalTheme::key_hint()),
        Span::styled("Step ", MedicalTheme::key_desc()),
        Span::styled("[←→] ", MedicalTheme::key_hint()),
        Span::styled("Choose ", MedicalTheme::key_desc()),
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Reset ", MedicalTheme::key_desc()),
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled("Analyze ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ])];

    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            format!("! {notice}"),
            MedicalTheme::danger(),
        )));
    }

    let footer = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

pub fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        "Heart Disease Prediction System | Powered by Advanced Machine Learning",
        MedicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
