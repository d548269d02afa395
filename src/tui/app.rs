//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Prediction and report requests

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::PdfReportRenderer;
use crate::application::PredictionService;

use super::ui::{
    form::{render_record_form, RecordFormState},
    render_disclaimer,
    result::{render_result, ReportStatus, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App {
    screen: Screen,

    should_quit: bool,

    service: PredictionService<PdfReportRenderer>,

    /// Where `R` writes the PDF
    report_dir: PathBuf,

    form_state: RecordFormState,

    /// Present once a prediction has run
    result_state: Option<ResultState>,
}

impl App {
    /// Create the application around an already-loaded service.
    #[must_use]
    pub fn new(service: PredictionService<PdfReportRenderer>, report_dir: PathBuf) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            service,
            report_dir,
            form_state: RecordFormState::default(),
            result_state: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.form_state.clear_sensitive();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match (&self.screen, &self.result_state) {
                    (Screen::Result, Some(state)) => render_result(f, chunks[0], state),
                    _ => render_record_form(f, chunks[0], &self.form_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    // Windows reports releases too.
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

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.cycle_choice(false),
            KeyCode::Right => self.form_state.cycle_choice(true),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') | KeyCode::Char('R') => self.save_report(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.screen = Screen::Form;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let outcome = self
            .form_state
            .to_record()
            .and_then(|record| {
                self.service
                    .assess_checked(&record)
                    .map_err(|e| e.to_string())
            });

        match outcome {
            Ok(assessment) => {
                self.result_state = Some(ResultState::new(assessment));
                self.form_state.error_message = None;
                self.screen = Screen::Result;
            }
            Err(message) => {
                self.form_state.error_message = Some(message);
            }
        }
    }

    fn save_report(&mut self) {
        let Some(state) = self.result_state.as_mut() else {
            return;
        };

        let outcome = self
            .service
            .render_report(&state.assessment)
            .and_then(|report| self.service.save_report(&report, &self.report_dir));

        state.report = Some(match outcome {
            Ok(path) => ReportStatus::Saved(path),
            Err(e) => {
                tracing::error!("Failed to save report: {e}");
                ReportStatus::Failed(e.to_string())
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fixtures, RiskTier};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn app(report_dir: PathBuf) -> App {
        let service = PredictionService::new(Arc::new(fixtures::store()), PdfReportRenderer::new());
        App::new(service, report_dir)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_submit_shows_result() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(temp.path().to_path_buf());

        // Sex is the second field; switch to Male for the high-risk fixture case.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Result);
        let state = app.result_state.as_ref().expect("result");
        assert_eq!(state.assessment.result.risk_tier, RiskTier::High);
        assert!(state.report.is_none());
    }

    #[test]
    fn test_invalid_form_stays_on_form() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(temp.path().to_path_buf());

        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Form);
        assert!(app.result_state.is_none());
        assert!(app.form_state.error_message.is_some());
    }

    #[test]
    fn test_report_key_saves_pdf() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(temp.path().join("out"));

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));

        let state = app.result_state.as_ref().expect("result");
        let expected = temp.path().join("out").join("Heart_Health_Report.pdf");
        assert_eq!(state.report, Some(ReportStatus::Saved(expected.clone())));
        let bytes = std::fs::read(expected).expect("report on disk");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_report_failure_keeps_result() {
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"x").expect("write");
        let mut app = app(blocker);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('R'));

        assert_eq!(app.screen(), Screen::Result);
        let state = app.result_state.as_ref().expect("result still shown");
        assert!(matches!(state.report, Some(ReportStatus::Failed(_))));
    }

    #[test]
    fn test_back_to_form_keeps_values() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(temp.path().to_path_buf());

        press(&mut app, KeyCode::Delete);
        for c in "63".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));

        assert_eq!(app.screen(), Screen::Form);
        assert_eq!(app.form_state.fields[0].value, "63");
    }

    #[test]
    fn test_quit_keys() {
        let temp = tempdir().expect("tempdir");

        let mut on_form = app(temp.path().to_path_buf());
        press(&mut on_form, KeyCode::Esc);
        assert!(on_form.should_quit());

        let mut on_result = app(temp.path().to_path_buf());
        press(&mut on_result, KeyCode::Enter);
        press(&mut on_result, KeyCode::Esc);
        assert!(!on_result.should_quit());
        on_result.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(on_result.should_quit());
    }
}
