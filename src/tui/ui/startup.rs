//! Blocking view shown when the artifacts could not be loaded.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::MedicalTheme;

/// Render the startup failure. No form is shown; exit is the only action.
pub fn render_startup_error(f: &mut Frame, area: Rect, message: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Model files not available", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "Check CARDIORISK_MODEL_DIR and restart the application.",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Startup Error ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );
    f.render_widget(content, chunks[0]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[any key] ", MedicalTheme::key_hint()),
        Span::styled("Press any key to exit", MedicalTheme::key_desc()),
    ]));
    f.render_widget(footer, chunks[1]);
}
