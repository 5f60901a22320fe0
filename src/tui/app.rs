//! Main TUI application state machine.
//!
//! Handles:
//! - Startup outcome (blocking error view or the form)
//! - Input event handling
//! - Synchronous risk assessment on submit

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::application::RiskAssessmentService;
use crate::ports::{Classifier, Preprocessor};

use super::ui::{
    form::{render_form, FormState},
    render_footer, render_header, render_key_hints,
    result::{render_result, ResultPanel},
    startup::render_startup_error,
};

/// Share of the body width given to the result panel.
const RESULT_PANEL_PERCENT: u16 = 42;

fn result_panel_width(body_width: u16) -> u16 {
    body_width * RESULT_PANEL_PERCENT / 100
}

/// What the application is showing
enum Phase<P, C>
where
    P: Preprocessor,
    C: Classifier,
{
    /// Artifacts could not be loaded; only exit is possible
    Halted { error: String },
    /// Form and result panel
    Ready {
        service: RiskAssessmentService<P, C>,
        form: FormState,
        panel: ResultPanel,
    },
}

/// Main application state
pub struct App<P, C>
where
    P: Preprocessor,
    C: Classifier,
{
    phase: Phase<P, C>,

    /// Whether the app should quit
    should_quit: bool,
}

impl<P, C> App<P, C>
where
    P: Preprocessor,
    C: Classifier,
{
    /// Create the application from the outcome of startup.
    ///
    /// A failed startup yields an application that only shows the error.
    pub fn from_startup(startup: crate::Result<RiskAssessmentService<P, C>>) -> Self {
        let phase = match startup {
            Ok(service) => Phase::Ready {
                service,
                form: FormState::default(),
                panel: ResultPanel::Empty,
            },
            Err(e) => {
                tracing::error!("Startup halted: {}", e);
                Phase::Halted {
                    error: e.to_string(),
                }
            }
        };

        Self {
            phase,
            should_quit: false,
        }
    }

    /// The startup error, if the artifacts could not be loaded.
    #[must_use]
    pub fn startup_error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Halted { error } => Some(error),
            Phase::Ready { .. } => None,
        }
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> crate::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> crate::Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Draw the current phase.
    pub fn draw(&self, f: &mut Frame) {
        let area = f.area();

        let (form, panel) = match &self.phase {
            Phase::Halted { error } => {
                render_startup_error(f, area, error);
                return;
            }
            Phase::Ready { form, panel, .. } => (form, panel),
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(0),    // Form and result
                Constraint::Length(3), // Key hints and notice
                Constraint::Length(2), // Footer
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(result_panel_width(chunks[1].width)),
            ])
            .split(chunks[1]);

        render_header(f, chunks[0]);
        render_form(f, body[0], form);
        render_result(f, body[1], panel);
        render_key_hints(f, chunks[2], form.notice.as_deref());
        render_footer(f, chunks[3]);
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let Phase::Ready {
            service,
            form,
            panel,
        } = &mut self.phase
        else {
            self.should_quit = true;
            return;
        };

        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right => form.cycle(true),
            KeyCode::Char('+') => form.step(true),
            KeyCode::Char('-') => form.step(false),
            KeyCode::Char('r') | KeyCode::Char('R') => form.reset(),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            KeyCode::Enter => {
                let record = form.to_record();
                *panel = match service.assess(&record) {
                    Ok(assessment) => ResultPanel::Assessed(assessment),
                    Err(e) => ResultPanel::Failed(e.to_string()),
                };
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::tempdir;

    use super::*;
    use crate::application::bootstrap::{self, fixtures};
    use crate::application::mocks::{service, MockClassifier, MockPreprocessor};
    use crate::config::ArtifactConfig;
    use crate::domain::strategies::valid_record;
    use crate::domain::{format_percent, FieldKind, PatientRecord, DISCLAIMER, FIELD_SPECS};
    use crate::ports::InferenceError;

    type MockApp = App<MockPreprocessor, MockClassifier>;

    /// Rendered cells, one `Vec` per row.
    fn cells<P: Preprocessor, C: Classifier>(
        app: &App<P, C>,
        width: u16,
        height: u16,
    ) -> Vec<Vec<String>> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|f| app.draw(f)).expect("draw");

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    fn screen<P: Preprocessor, C: Classifier>(app: &App<P, C>) -> String {
        cells(app, 140, 50)
            .iter()
            .map(|row| row.concat())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn press(app: &mut MockApp, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    /// Text shown for a field value, as the form displays it.
    fn shown(spec_index: usize, value: f64) -> String {
        match FIELD_SPECS[spec_index].kind {
            FieldKind::Numeric { decimals, .. } => format!("{value:.decimals$}"),
            FieldKind::Choice { options } => options
                .iter()
                .find(|(code, _)| f64::from(*code) == value)
                .map(|(_, label)| (*label).to_string())
                .expect("known option"),
        }
    }

    /// Enter a record into a fresh form through the keyboard.
    fn fill_record(app: &mut MockApp, record: &PatientRecord) {
        for (i, value) in record.to_row().into_iter().enumerate() {
            match FIELD_SPECS[i].kind {
                FieldKind::Numeric { .. } => {
                    press(app, KeyCode::Delete);
                    for c in shown(i, value).chars() {
                        press(app, KeyCode::Char(c));
                    }
                }
                FieldKind::Choice { options } => {
                    let index = options
                        .iter()
                        .position(|(code, _)| f64::from(*code) == value)
                        .expect("known option");
                    for _ in 0..index {
                        press(app, KeyCode::Right);
                    }
                }
            }
            press(app, KeyCode::Tab);
        }
    }

    fn tracked(label: i64, probability: f64) -> (Arc<MockPreprocessor>, MockApp) {
        let preprocessor = Arc::new(MockPreprocessor::default());
        let svc = RiskAssessmentService::new(
            Arc::clone(&preprocessor),
            Arc::new(MockClassifier { label, probability }),
        );
        (preprocessor, App::from_startup(Ok(svc)))
    }

    fn cleveland() -> PatientRecord {
        PatientRecord {
            age: 63.0,
            sex: 1.0,
            cp: 3.0,
            trestbps: 145.0,
            chol: 233.0,
            fbs: 1.0,
            restecg: 0.0,
            thalach: 150.0,
            exang: 0.0,
            oldpeak: 2.3,
            slope: 0.0,
            ca: 0.0,
            thal: 1.0,
        }
    }

    #[test]
    fn test_high_risk_scenario() {
        let (preprocessor, mut app) = tracked(1, 0.84);

        fill_record(&mut app, &cleveland());
        press(&mut app, KeyCode::Enter);

        let seen = *preprocessor.last.lock().expect("lock");
        assert_eq!(seen, Some(cleveland()));

        let text = screen(&app);
        assert!(text.contains("High Risk Alert"));
        assert!(text.contains("Risk Probability: 84.0%"));
        assert!(!text.contains("Low Risk"));
        assert!(text.contains("Age (years)"));
    }

    #[test]
    fn test_low_risk_scenario() {
        let mut app = App::from_startup(Ok(service(MockPreprocessor::default(), 0, 0.12)));
        fill_record(&mut app, &cleveland());
        press(&mut app, KeyCode::Enter);

        let text = screen(&app);
        assert!(text.contains("OK Low Risk"));
        assert!(text.contains("Risk Probability: 12.0%"));
        assert!(!text.contains("High Risk Alert"));
    }

    #[test]
    fn test_no_result_before_submit() {
        let app = App::from_startup(Ok(service(MockPreprocessor::default(), 1, 0.84)));
        let text = screen(&app);
        assert!(text.contains("Instructions"));
        assert!(!text.contains("Risk Probability"));
        for heading in [
            "Patient Demographics",
            "Chest Pain & Symptoms",
            "Heart Rate & Exercise",
            "Additional Cardiac Indicators",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("Powered by Advanced Machine Learning"));
    }

    #[test]
    fn test_standard_terminal_shows_every_value_and_full_template() {
        let (width, height) = (80, 24);
        let form_width = usize::from(width - result_panel_width(width));

        for (label, probability, headline, percent) in [
            (1, 0.84, "! High Risk Alert", "Risk Probability: 84.0%"),
            (0, 0.12, "OK Low Risk", "Risk Probability: 12.0%"),
        ] {
            let mut app = App::from_startup(Ok(service(
                MockPreprocessor::default(),
                label,
                probability,
            )));
            let record = cleveland();
            fill_record(&mut app, &record);
            press(&mut app, KeyCode::Enter);

            let rows = cells(&app, width, height);
            let form_rows: Vec<String> =
                rows.iter().map(|row| row[..form_width].concat()).collect();
            for (i, value) in record.to_row().into_iter().enumerate() {
                let short = FIELD_SPECS[i].short;
                let text = shown(i, value);
                assert!(
                    form_rows.iter().any(|row| row.contains(short) && row.contains(&text)),
                    "{short} = {text} not visible"
                );
            }

            // Body rows inside the result panel borders, rewrapped into single spaces.
            let panel_words: Vec<String> = rows[2..rows.len() - 5]
                .iter()
                .map(|row| row[form_width + 1..row.len() - 1].concat())
                .flat_map(|row| {
                    row.split_whitespace()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect();
            let panel = panel_words.join(" ");
            assert!(panel.contains(headline), "{panel}");
            assert!(panel.contains(percent), "{panel}");
            assert!(panel.contains(&format!("Important Note: {DISCLAIMER}")), "{panel}");
        }
    }

    #[test]
    fn test_transform_failure_keeps_form_usable() {
        let mut app = App::from_startup(Ok(service(
            MockPreprocessor::failing(InferenceError::Failed("scaler unavailable".into())),
            1,
            0.84,
        )));
        press(&mut app, KeyCode::Enter);

        assert!(!app.should_quit());
        assert!(app.startup_error().is_none());

        let text = screen(&app);
        assert!(text.contains("Error making prediction"));
        assert!(text.contains("Age (years)"));
        assert!(!text.contains("Risk Probability"));

        // Still editable and resubmittable.
        press(&mut app, KeyCode::Char('+'));
        press(&mut app, KeyCode::Enter);
        let Phase::Ready { form, panel, .. } = &mut app.phase else {
            panic!("form should still be shown");
        };
        assert!((form.to_record().age - 51.0).abs() < f64::EPSILON);
        assert!(matches!(panel, ResultPanel::Failed(_)));
    }

    #[test]
    fn test_edit_keeps_last_result() {
        let mut app = App::from_startup(Ok(service(MockPreprocessor::default(), 1, 0.84)));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('7'));
        press(&mut app, KeyCode::Char('r'));

        assert!(screen(&app).contains("Risk Probability: 84.0%"));
    }

    #[test]
    fn test_rejected_value_shows_notice() {
        let mut app = App::from_startup(Ok(service(MockPreprocessor::default(), 0, 0.1)));
        press(&mut app, KeyCode::Delete);
        for c in "150".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);

        let text = screen(&app);
        assert!(text.contains("Value must be between 0 and 120"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::from_startup(Ok(service(MockPreprocessor::default(), 0, 0.1)));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());

        let mut app = App::from_startup(Ok(service(MockPreprocessor::default(), 0, 0.1)));
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[test]
    fn test_missing_preprocessor_shows_no_form() {
        let temp = tempdir().expect("tempdir");
        fixtures::write_model(temp.path());

        let mut app = App::from_startup(bootstrap::start(&ArtifactConfig::in_dir(temp.path())));
        let error = app.startup_error().expect("halted").to_string();
        assert!(error.contains("preprocessor"));

        let text = screen(&app);
        assert!(text.contains("Press any key to exit"));
        assert!(!text.contains("Age (years)"));

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.should_quit());
    }

    #[test]
    fn test_missing_model_shows_no_form() {
        let temp = tempdir().expect("tempdir");
        fixtures::write_preprocessor(temp.path());

        let app = App::from_startup(bootstrap::start(&ArtifactConfig::in_dir(temp.path())));
        assert!(app.startup_error().expect("halted").contains("model"));

        let text = screen(&app);
        assert!(text.contains("Startup Error"));
        assert!(!text.contains("Age (years)"));
        assert!(!text.contains("Analyze"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_label_selects_one_template(
            label in 0i64..=1,
            p in 0.0f64..=1.0,
            record in valid_record(),
        ) {
            let (preprocessor, mut app) = tracked(label, p);
            fill_record(&mut app, &record);
            press(&mut app, KeyCode::Enter);

            let seen = *preprocessor.last.lock().expect("lock");
            prop_assert_eq!(seen, Some(record));

            let text = screen(&app);
            let high = text.contains("High Risk Alert");
            let low = text.contains("Low Risk");
            prop_assert!(high != low);
            prop_assert_eq!(high, label == 1);
            let expected = format!("Risk Probability: {}", format_percent(p));
            prop_assert!(text.contains(&expected));
        }
    }
}
