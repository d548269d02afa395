//! Clinical record entry form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{bounds, ChestPainType, ClinicalRecord, Sex};
use crate::tui::styles::CardioTheme;

const MAX_INPUT_LEN: usize = 8;

const ANGINA_CHOICES: [&str; 2] = ["No", "Yes"];
const SEX_CHOICES: [&str; 2] = ["Female", "Male"];

/// Input behavior of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Whole numbers only
    Integer,
    /// Decimal number
    Decimal,
    /// Fixed options cycled with ←/→
    Choice(&'static [&'static str]),
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
    /// Text buffer for numeric fields
    pub value: String,
    /// Selected option for choice fields
    pub choice: usize,
}

impl FormField {
    fn integer(label: &'static str, hint: &'static str, value: u16) -> Self {
        Self {
            label,
            hint,
            kind: FieldKind::Integer,
            value: value.to_string(),
            choice: 0,
        }
    }

    fn choice(label: &'static str, options: &'static [&'static str], choice: usize) -> Self {
        Self {
            label,
            hint: "←/→ to change",
            kind: FieldKind::Choice(options),
            value: String::new(),
            choice,
        }
    }

    /// Text shown in the field box.
    #[must_use]
    pub fn display(&self) -> &str {
        match self.kind {
            FieldKind::Choice(options) => options.get(self.choice).copied().unwrap_or(""),
            FieldKind::Integer | FieldKind::Decimal => &self.value,
        }
    }
}

// Field order on screen.
const AGE: usize = 0;
const SEX: usize = 1;
const CHEST_PAIN: usize = 2;
const RESTING_BP: usize = 3;
const CHOLESTEROL: usize = 4;
const MAX_HEART_RATE: usize = 5;
const OXYGEN_STRESS: usize = 6;
const EXERCISE_ANGINA: usize = 7;

const CHEST_PAIN_CHOICES: [&str; 3] = [
    "Typical Chest Pain",
    "Atypical Chest Pain",
    "Non-Cardiac Chest Pain",
];

/// Form state
pub struct RecordFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for RecordFormState {
    fn default() -> Self {
        Self::from_record(&ClinicalRecord::default())
    }
}

impl RecordFormState {
    /// Pre-fill the form from a record.
    #[must_use]
    pub fn from_record(record: &ClinicalRecord) -> Self {
        let sex = Sex::ALL.iter().position(|s| *s == record.sex).unwrap_or(0);
        let chest_pain = ChestPainType::ALL
            .iter()
            .position(|c| *c == record.chest_pain)
            .unwrap_or(0);

        let fields = vec![
            FormField::integer("Age", "years (20-90)", record.age),
            FormField::choice("Sex", &SEX_CHOICES, sex),
            FormField::choice("Chest Pain Type", &CHEST_PAIN_CHOICES, chest_pain),
            FormField::integer("Resting BP", "mmHg (80-200)", record.resting_bp),
            FormField::integer("Cholesterol", "mg/dL (100-600)", record.cholesterol),
            FormField::integer("Max Heart Rate", "bpm (50-220)", record.max_heart_rate),
            FormField {
                label: "Heart Oxygen Stress Score",
                hint: "ST depression (0.0-10.0)",
                kind: FieldKind::Decimal,
                value: record.oxygen_stress_label(),
                choice: 0,
            },
            FormField::choice(
                "Exercise Induced Angina",
                &ANGINA_CHOICES,
                usize::from(record.exercise_angina),
            ),
        ];

        Self {
            fields,
            selected_field: 0,
            error_message: None,
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle the option of a choice field.
    pub fn cycle_choice(&mut self, forward: bool) {
        let field = &mut self.fields[self.selected_field];
        if let FieldKind::Choice(options) = field.kind {
            let n = options.len();
            field.choice = if forward {
                (field.choice + 1) % n
            } else {
                (field.choice + n - 1) % n
            };
            self.error_message = None;
        }
    }

    /// Add a character to the current numeric field.
    pub fn input_char(&mut self, c: char) {
        let field = &mut self.fields[self.selected_field];
        let accepted = match field.kind {
            FieldKind::Integer => {
                if c == '.' {
                    self.error_message = Some(format!("{}: whole numbers only", field.label));
                    return;
                }
                c.is_ascii_digit()
            }
            FieldKind::Decimal => c.is_ascii_digit() || (c == '.' && !field.value.contains('.')),
            FieldKind::Choice(_) => false,
        };
        if accepted && field.value.len() < MAX_INPUT_LEN {
            field.value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.zeroize();
    }

    /// Wipe all field buffers from memory.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            field.value.zeroize();
            field.choice = 0;
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    fn parse_integer(&self, index: usize) -> Result<u16, String> {
        let field = &self.fields[index];
        field
            .value
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("{}: enter a whole number", field.label))
    }

    /// Parse and validate the form into a record.
    ///
    /// # Errors
    /// Returns a message naming every unparsable or out-of-range field.
    pub fn to_record(&self) -> Result<ClinicalRecord, String> {
        let mut errors = Vec::new();
        let mut integer = |index: usize| {
            self.parse_integer(index).unwrap_or_else(|e| {
                errors.push(e);
                0
            })
        };

        let age = integer(AGE);
        let resting_bp = integer(RESTING_BP);
        let cholesterol = integer(CHOLESTEROL);
        let max_heart_rate = integer(MAX_HEART_RATE);

        let oxygen_field = &self.fields[OXYGEN_STRESS];
        let oxygen_stress = match oxygen_field.value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                errors.push(format!("{}: enter a number", oxygen_field.label));
                0.0
            }
        };

        if !errors.is_empty() {
            return Err(errors.join(", "));
        }

        let record = ClinicalRecord {
            age,
            resting_bp,
            cholesterol,
            max_heart_rate,
            oxygen_stress,
            sex: Sex::ALL[self.fields[SEX].choice % Sex::ALL.len()],
            chest_pain: ChestPainType::ALL[self.fields[CHEST_PAIN].choice % ChestPainType::ALL.len()],
            exercise_angina: self.fields[EXERCISE_ANGINA].choice == 1,
        };

        record.validate().map_err(|errors| errors.join(", "))?;
        Ok(record)
    }
}

/// Render the record entry form
pub fn render_record_form(f: &mut Frame, area: Rect, state: &RecordFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CardioTheme::text()),
        Span::styled("Heart Disease Risk Assessment", CardioTheme::title()),
        Span::styled(
            format!(
                " │ ages {}-{}, BP {}-{} mmHg",
                bounds::AGE.start(),
                bounds::AGE.end(),
                bounds::RESTING_BP.start(),
                bounds::RESTING_BP.end()
            ),
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

fn render_form_fields(f: &mut Frame, area: Rect, state: &RecordFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;
    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(f, columns[1], &state.fields[mid..], mid, state.selected_field);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (CardioTheme::border_focused(), CardioTheme::subtitle())
        } else {
            (CardioTheme::border(), CardioTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match field.kind {
            FieldKind::Choice(_) => {
                spans.push(Span::styled("◀ ", CardioTheme::text_muted()));
                spans.push(Span::styled(field.display(), CardioTheme::text()));
                spans.push(Span::styled(" ▶", CardioTheme::text_muted()));
            }
            FieldKind::Integer | FieldKind::Decimal if field.value.is_empty() => {
                spans.push(Span::styled(field.hint, CardioTheme::text_muted()));
            }
            FieldKind::Integer | FieldKind::Decimal => {
                spans.push(Span::styled(field.display(), CardioTheme::text()));
            }
        }
        if is_selected && !matches!(field.kind, FieldKind::Choice(_)) {
            spans.push(Span::styled("▌", CardioTheme::key_hint()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &RecordFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", CardioTheme::danger()),
            Span::styled(err.clone(), CardioTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", CardioTheme::key_hint()),
            Span::styled("Navigate ", CardioTheme::key_desc()),
            Span::styled("[←→] ", CardioTheme::key_hint()),
            Span::styled("Change ", CardioTheme::key_desc()),
            Span::styled("[Enter] ", CardioTheme::key_hint()),
            Span::styled("Predict ", CardioTheme::key_desc()),
            Span::styled("[Esc] ", CardioTheme::key_hint()),
            Span::styled("Quit", CardioTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(state: &mut RecordFormState, index: usize) {
        state.selected_field = index;
    }

    fn retype(state: &mut RecordFormState, index: usize, text: &str) {
        select(state, index);
        state.clear_field();
        for c in text.chars() {
            state.input_char(c);
        }
    }

    #[test]
    fn test_defaults_parse_to_default_record() {
        let state = RecordFormState::default();
        assert_eq!(state.fields[OXYGEN_STRESS].value, "1.0");
        assert_eq!(state.fields[SEX].display(), "Female");
        assert_eq!(state.fields[CHEST_PAIN].display(), "Typical Chest Pain");
        assert_eq!(state.fields[EXERCISE_ANGINA].display(), "No");
        assert_eq!(state.to_record(), Ok(ClinicalRecord::default()));
    }

    #[test]
    fn test_choice_cycling_wraps() {
        let mut state = RecordFormState::default();
        select(&mut state, CHEST_PAIN);
        state.cycle_choice(false);
        assert_eq!(state.fields[CHEST_PAIN].display(), "Non-Cardiac Chest Pain");
        state.cycle_choice(true);
        state.cycle_choice(true);
        assert_eq!(state.fields[CHEST_PAIN].display(), "Atypical Chest Pain");

        select(&mut state, SEX);
        state.cycle_choice(true);
        select(&mut state, EXERCISE_ANGINA);
        state.cycle_choice(true);

        let record = state.to_record().expect("valid");
        assert_eq!(record.sex, Sex::Male);
        assert_eq!(record.chest_pain, ChestPainType::Atypical);
        assert!(record.exercise_angina);
    }

    #[test]
    fn test_integer_fields_reject_decimals() {
        let mut state = RecordFormState::default();
        retype(&mut state, AGE, "45.5");
        assert_eq!(state.fields[AGE].value, "455");
        assert!(state.error_message.is_none());

        retype(&mut state, AGE, "4.");
        assert_eq!(state.fields[AGE].value, "4");
        assert_eq!(state.error_message.as_deref(), Some("Age: whole numbers only"));
    }

    #[test]
    fn test_decimal_field_accepts_single_point() {
        let mut state = RecordFormState::default();
        retype(&mut state, OXYGEN_STRESS, "2.3.5");
        assert_eq!(state.fields[OXYGEN_STRESS].value, "2.35");
        assert_eq!(state.to_record().expect("valid").oxygen_stress, 2.35);
    }

    #[test]
    fn test_out_of_range_is_reported() {
        let mut state = RecordFormState::default();
        retype(&mut state, AGE, "19");
        retype(&mut state, CHOLESTEROL, "601");
        let err = state.to_record().expect_err("out of range");
        assert!(err.contains("Age 19"));
        assert!(err.contains("Cholesterol 601"));
    }

    #[test]
    fn test_empty_field_is_reported() {
        let mut state = RecordFormState::default();
        retype(&mut state, RESTING_BP, "");
        let err = state.to_record().expect_err("empty");
        assert_eq!(err, "Resting BP: enter a whole number");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = RecordFormState::default();
        state.prev_field();
        assert_eq!(state.selected_field, EXERCISE_ANGINA);
        state.next_field();
        assert_eq!(state.selected_field, AGE);
    }

    #[test]
    fn test_clear_sensitive() {
        let mut state = RecordFormState::default();
        state.selected_field = 3;
        state.clear_sensitive();
        assert!(state.fields.iter().all(|f| f.value.is_empty()));
        assert_eq!(state.selected_field, 0);
    }
}
