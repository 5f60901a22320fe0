//! Patient data input form.
//!
//! Every field always holds an in-domain value. Typed text is only committed
//! when it parses and fits the field's domain; otherwise the previous value
//! is restored and a notice is shown.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{FieldKind, FieldSpec, PatientRecord, FIELD_SPECS};
use crate::tui::styles::MedicalTheme;

/// Field groups as `(heading, first field, end)`, in `FIELD_SPECS` order.
const SECTIONS: [(&str, usize, usize); 4] = [
    ("Patient Demographics", 0, 2),
    ("Chest Pain & Symptoms", 2, 6),
    ("Heart Rate & Exercise", 6, 9),
    ("Additional Cardiac Indicators", 9, 13),
];

/// Sections drawn in the left column of the boxed layout.
const LEFT_SECTIONS: usize = 2;

/// Rows taken by one boxed field.
const BOXED_FIELD_HEIGHT: u16 = 3;

/// Narrowest column that fits the longest boxed choice.
const BOXED_COLUMN_WIDTH: u16 = 36;

/// Width of the label column in the one-line layout.
const COMPACT_LABEL_WIDTH: usize = 15;

/// Current content of one input control.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Numeric {
        value: f64,
        /// Uncommitted text while the user is typing.
        buffer: Option<String>,
    },
    Choice { index: usize },
}

/// Form field: its definition plus its current input
#[derive(Debug, Clone)]
pub struct FormField {
    pub spec: &'static FieldSpec,
    pub input: FieldInput,
}

impl FormField {
    fn new(spec: &'static FieldSpec) -> Self {
        let input = match spec.kind {
            FieldKind::Numeric { default, .. } => FieldInput::Numeric {
                value: default,
                buffer: None,
            },
            FieldKind::Choice { .. } => FieldInput::Choice { index: 0 },
        };
        Self { spec, input }
    }

    /// Committed value of the field.
    #[must_use]
    pub fn value(&self) -> f64 {
        match (&self.input, self.spec.kind) {
            (FieldInput::Numeric { value, .. }, _) => *value,
            (FieldInput::Choice { index }, FieldKind::Choice { options }) => {
                options.get(*index).map_or(0.0, |(code, _)| f64::from(*code))
            }
            (FieldInput::Choice { .. }, FieldKind::Numeric { default, .. }) => default,
        }
    }

    /// Text shown inside the control.
    #[must_use]
    pub fn display(&self) -> String {
        match (&self.input, self.spec.kind) {
            (FieldInput::Numeric { buffer: Some(text), .. }, _) => text.clone(),
            (FieldInput::Numeric { value, .. }, FieldKind::Numeric { decimals, .. }) => {
                format!("{value:.decimals$}")
            }
            (FieldInput::Numeric { value, .. }, FieldKind::Choice { .. }) => value.to_string(),
            (FieldInput::Choice { index }, FieldKind::Choice { options }) => options
                .get(*index)
                .map(|(_, label)| (*label).to_string())
                .unwrap_or_default(),
            (FieldInput::Choice { .. }, FieldKind::Numeric { .. }) => String::new(),
        }
    }

    fn is_editing(&self) -> bool {
        matches!(self.input, FieldInput::Numeric { buffer: Some(_), .. })
    }

    /// Commit typed text. Returns the rejection notice if the text was refused.
    fn commit(&mut self) -> Option<String> {
        let FieldInput::Numeric { value, buffer } = &mut self.input else {
            return None;
        };
        let text = buffer.take()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let parsed = match trimmed.parse::<f64>() {
            Ok(v) => v,
            Err(_) => return Some(format!("{}: Invalid number", self.spec.label)),
        };
        match self.spec.check(parsed) {
            Ok(()) => {
                *value = parsed;
                None
            }
            Err(notice) => Some(notice),
        }
    }

    fn step(&mut self, up: bool) {
        let FieldKind::Numeric {
            min,
            max,
            step,
            decimals,
            ..
        } = self.spec.kind
        else {
            return;
        };
        let FieldInput::Numeric { value, buffer } = &mut self.input else {
            return;
        };

        *buffer = None;
        let delta = if up { step } else { -step };
        let factor = 10f64.powi(decimals as i32);
        let mut next = ((*value + delta) * factor).round() / factor;
        next = next.max(min);
        if let Some(max) = max {
            next = next.min(max);
        }
        *value = next;
    }

    fn cycle(&mut self, forward: bool) {
        let (FieldInput::Choice { index }, FieldKind::Choice { options }) =
            (&mut self.input, self.spec.kind)
        else {
            return;
        };
        let len = options.len();
        if len == 0 {
            return;
        }
        *index = if forward {
            (*index + 1) % len
        } else {
            (*index + len - 1) % len
        };
    }
}

/// Patient form state
pub struct FormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    /// Widget-level notice, e.g. a rejected value.
    pub notice: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: FIELD_SPECS.iter().map(FormField::new).collect(),
            selected_field: 0,
            notice: None,
        }
    }
}

impl FormState {
    fn selected(&mut self) -> &mut FormField {
        &mut self.fields[self.selected_field]
    }

    fn commit_selected(&mut self) {
        if let Some(notice) = self.selected().commit() {
            self.notice = Some(notice);
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.commit_selected();
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        self.commit_selected();
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Type a character into the current numeric field.
    ///
    /// The first keystroke replaces the shown value.
    pub fn input_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '.') {
            return;
        }
        let field = self.selected();
        if let FieldInput::Numeric { buffer, .. } = &mut field.input {
            buffer.get_or_insert_with(String::new).push(c);
            self.notice = None;
        }
    }

    /// Delete the last typed character
    pub fn delete_char(&mut self) {
        let field = self.selected();
        if let FieldInput::Numeric { value, buffer } = &mut field.input {
            let decimals = match field.spec.kind {
                FieldKind::Numeric { decimals, .. } => decimals,
                FieldKind::Choice { .. } => 0,
            };
            let text = buffer.get_or_insert_with(|| format!("{value:.decimals$}"));
            text.pop();
        }
    }

    /// Clear the typed text of the current field
    pub fn clear_field(&mut self) {
        if let FieldInput::Numeric { buffer, .. } = &mut self.selected().input {
            *buffer = Some(String::new());
        }
    }

    /// Step the current numeric field by its increment
    pub fn step(&mut self, up: bool) {
        self.commit_selected();
        self.selected().step(up);
    }

    /// Cycle the current choice field
    pub fn cycle(&mut self, forward: bool) {
        self.selected().cycle(forward);
    }

    /// Restore every field to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Commit pending text and assemble the record.
    ///
    /// Rejected text leaves the field at its previous value, so a complete
    /// record is always produced.
    pub fn to_record(&mut self) -> PatientRecord {
        for i in 0..self.fields.len() {
            if let Some(notice) = self.fields[i].commit() {
                self.notice = Some(notice);
            }
        }

        let mut row = [0.0; PatientRecord::FIELD_COUNT];
        for (slot, field) in row.iter_mut().zip(&self.fields) {
            *slot = field.value();
        }
        PatientRecord::from_row(row)
    }
}

/// Render the input form.
///
/// Two columns of boxed fields when there is room, otherwise one line per
/// field, scrolled to keep the selected field visible.
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let boxed_height = SECTIONS
        .iter()
        .map(|(_, start, end)| 1 + BOXED_FIELD_HEIGHT * (end - start) as u16);
    let left: u16 = boxed_height.clone().take(LEFT_SECTIONS).sum();
    let right: u16 = boxed_height.skip(LEFT_SECTIONS).sum();

    if area.height >= left.max(right) && area.width >= 2 * BOXED_COLUMN_WIDTH {
        render_boxed(f, area, state);
    } else {
        render_compact(f, area, state);
    }
}

fn render_boxed(f: &mut Frame, area: Rect, state: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (left, right) = SECTIONS.split_at(LEFT_SECTIONS);
    render_boxed_column(f, columns[0], left, state);
    render_boxed_column(f, columns[1], right, state);
}

fn render_boxed_column(
    f: &mut Frame,
    area: Rect,
    sections: &[(&str, usize, usize)],
    state: &FormState,
) {
    let mut constraints = Vec::new();
    for (_, start, end) in sections {
        constraints.push(Constraint::Length(1));
        constraints.extend((*start..*end).map(|_| Constraint::Length(BOXED_FIELD_HEIGHT)));
    }
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut slot = 0;
    for (heading, start, end) in sections {
        f.render_widget(
            Paragraph::new(Span::styled(*heading, MedicalTheme::subtitle())),
            chunks[slot],
        );
        slot += 1;

        for i in *start..*end {
            render_boxed_field(f, chunks[slot], &state.fields[i], i == state.selected_field);
            slot += 1;
        }
    }
}

fn render_boxed_field(f: &mut Frame, area: Rect, field: &FormField, is_selected: bool) {
    let border_style = if is_selected {
        MedicalTheme::border_focused()
    } else {
        MedicalTheme::border()
    };

    let title_style = if is_selected {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", field.spec.label), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let value = match field.spec.kind {
        FieldKind::Choice { .. } if is_selected => format!("< {} >", field.display()),
        _ => field.display(),
    };

    let mut spans = vec![Span::raw(" "), Span::styled(value, MedicalTheme::text())];
    push_cursor_and_hint(&mut spans, field, is_selected);

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_compact(f: &mut Frame, area: Rect, state: &FormState) {
    let mut lines = Vec::new();
    let mut selected_line = 0;

    for (heading, start, end) in SECTIONS {
        lines.push(Line::from(Span::styled(heading, MedicalTheme::subtitle())));
        for i in start..end {
            let is_selected = i == state.selected_field;
            if is_selected {
                selected_line = lines.len();
            }
            lines.push(compact_line(&state.fields[i], is_selected));
        }
    }

    let offset = (selected_line + 1).saturating_sub(usize::from(area.height));
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
}

fn compact_line(field: &FormField, is_selected: bool) -> Line<'static> {
    let (marker, label_style, value_style) = if is_selected {
        ("▸ ", MedicalTheme::focused(), MedicalTheme::focused())
    } else {
        ("  ", MedicalTheme::text_secondary(), MedicalTheme::text())
    };

    let mut spans = vec![
        Span::styled(marker, MedicalTheme::cursor()),
        Span::styled(
            format!("{:<width$}", field.spec.short, width = COMPACT_LABEL_WIDTH),
            label_style,
        ),
        Span::styled(field.display(), value_style),
    ];
    push_cursor_and_hint(&mut spans, field, is_selected);
    Line::from(spans)
}

fn push_cursor_and_hint(spans: &mut Vec<Span<'static>>, field: &FormField, is_selected: bool) {
    if is_selected && field.is_editing() {
        spans.push(Span::styled("▌", MedicalTheme::cursor()));
    }
    spans.push(Span::styled(
        format!("  {}", field.spec.hint),
        MedicalTheme::text_muted(),
    ));
}
