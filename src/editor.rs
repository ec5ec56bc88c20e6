//! Cell editor: the view/edit state machine for a single cell.
//!
//! A cell is in View until activated. Activation opens a `CellEditor` seeded
//! with the committed value; Enter or loss of focus commits the buffer,
//! Escape discards it. A buffer nobody changed commits nothing, so opening a
//! cell never rewrites it. Which cell may be open is decided by the table,
//! not here.

use crate::model::{Column, ColumnKind, Value};
use crate::table::CellRef;

pub const MISSING_NUMBER: &str = "A number is missing here...";
pub const MISSING_TEXT: &str = "A text is missing here...";

/// What a cell shows when it is not being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellDisplay {
    Value(String),
    Placeholder(&'static str),
}

impl CellDisplay {
    pub fn text(&self) -> &str {
        match self {
            CellDisplay::Value(s) => s,
            CellDisplay::Placeholder(s) => s,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, CellDisplay::Placeholder(_))
    }
}

/// View-mode text for a value of the given column kind.
pub fn display_value(kind: &ColumnKind, value: Option<&Value>) -> CellDisplay {
    let value = value.unwrap_or(&Value::Null);
    match kind {
        ColumnKind::Boolean => {
            let text = if matches!(value, Value::Bool(true)) { "Yes" } else { "No" };
            CellDisplay::Value(text.to_string())
        }
        ColumnKind::Select { .. } => CellDisplay::Value(value.to_string()),
        ColumnKind::Number => match value {
            Value::Number(n) => CellDisplay::Value(format_grouped(*n)),
            v if v.is_missing() => CellDisplay::Placeholder(MISSING_NUMBER),
            v => CellDisplay::Value(v.to_string()),
        },
        ColumnKind::String | ColumnKind::Other(_) => {
            if value.is_missing() {
                CellDisplay::Placeholder(MISSING_TEXT)
            } else {
                CellDisplay::Value(value.to_string())
            }
        }
    }
}

/// Group integer digits with commas and keep at most three fraction digits,
/// e.g. `1234567.8912` -> `1,234,567.891`.
pub fn format_grouped(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞".into() } else { "-∞".into() };
    }

    let fixed = format!("{:.3}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if n < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Coerce numeric input text. Anything that does not parse to a finite number,
/// including empty text, becomes `0`.
pub fn coerce_number(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

/// Single-line text with a byte cursor that always sits on a char boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(text: String) -> Self {
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position counted in chars, for drawing.
    pub fn cursor_chars(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .chars()
            .next_back()
            .map_or(0, |c| self.cursor - c.len_utf8())
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.prev_boundary();
        self.text.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        let end = self.next_boundary();
        self.text.drain(self.cursor..end);
        true
    }

    fn left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    fn right(&mut self) {
        self.cursor = self.next_boundary();
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.text.len();
    }
}

/// Edit buffer, one variant per column kind.
#[derive(Debug, Clone, PartialEq)]
pub enum EditBuffer {
    Text(TextInput),
    /// Raw text as typed plus its coerced value. `value` keeps the seeded
    /// value until the first keystroke.
    Number { input: TextInput, value: Value },
    Boolean(bool),
    /// Index into `options`; the buffer can only ever name an enumerated option.
    Select { options: Vec<String>, index: usize },
}

impl EditBuffer {
    fn seed(kind: &ColumnKind, current: &Value) -> Self {
        match kind {
            ColumnKind::Boolean => EditBuffer::Boolean(matches!(current, Value::Bool(true))),
            ColumnKind::Select { options } => {
                let index = current
                    .as_str()
                    .and_then(|v| options.iter().position(|o| o == v))
                    .unwrap_or(0);
                EditBuffer::Select {
                    options: options.clone(),
                    index,
                }
            }
            ColumnKind::Number => {
                let value = match current {
                    Value::Number(_) => current.clone(),
                    _ => Value::Null,
                };
                EditBuffer::Number {
                    input: TextInput::new(value.to_string()),
                    value,
                }
            }
            ColumnKind::String | ColumnKind::Other(_) => {
                EditBuffer::Text(TextInput::new(current.to_string()))
            }
        }
    }

    /// The value a commit would store. `None` only for a select with no options.
    pub fn value(&self) -> Option<Value> {
        match self {
            EditBuffer::Text(input) => Some(Value::Text(input.text().to_string())),
            EditBuffer::Number { value, .. } => Some(value.clone()),
            EditBuffer::Boolean(b) => Some(Value::Bool(*b)),
            EditBuffer::Select { options, index } => options.get(*index).cloned().map(Value::Text),
        }
    }

    /// Text shown inside the open editor.
    pub fn edit_text(&self) -> String {
        match self {
            EditBuffer::Text(input) | EditBuffer::Number { input, .. } => input.text().to_string(),
            EditBuffer::Boolean(true) => "Yes".into(),
            EditBuffer::Boolean(false) => "No".into(),
            EditBuffer::Select { options, index } => options.get(*index).cloned().unwrap_or_default(),
        }
    }

    fn input_mut(&mut self) -> Option<&mut TextInput> {
        match self {
            EditBuffer::Text(input) | EditBuffer::Number { input, .. } => Some(input),
            EditBuffer::Boolean(_) | EditBuffer::Select { .. } => None,
        }
    }

    fn recoerce(&mut self) {
        if let EditBuffer::Number { input, value } = self {
            *value = Value::Number(coerce_number(input.text()));
        }
    }
}

/// An open editor bound to one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEditor {
    cell: CellRef,
    buffer: EditBuffer,
    /// Set by the first keystroke that changes the buffer.
    touched: bool,
}

impl CellEditor {
    /// Enter Edit, seeding the buffer from the committed value.
    pub fn open(cell: CellRef, column: &Column, current: Option<&Value>) -> Self {
        let buffer = EditBuffer::seed(&column.kind, current.unwrap_or(&Value::Null));
        Self {
            cell,
            buffer,
            touched: false,
        }
    }

    pub fn cell(&self) -> &CellRef {
        &self.cell
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Type a character. Number buffers drop characters that cannot be part
    /// of a number; boolean and select buffers take `y`/`n` and ignore the rest.
    pub fn insert_char(&mut self, ch: char) {
        let changed = match &mut self.buffer {
            EditBuffer::Text(input) => {
                input.insert(ch);
                true
            }
            EditBuffer::Number { input, value } => {
                let accepted = is_numeric_char(ch);
                if accepted {
                    input.insert(ch);
                    *value = Value::Number(coerce_number(input.text()));
                }
                accepted
            }
            EditBuffer::Boolean(b) => match ch {
                'y' | 'Y' => {
                    *b = true;
                    true
                }
                'n' | 'N' => {
                    *b = false;
                    true
                }
                ' ' => {
                    *b = !*b;
                    true
                }
                _ => false,
            },
            EditBuffer::Select { options, index } => {
                let accepted = ch == ' ' && !options.is_empty();
                if accepted {
                    *index = (*index + 1) % options.len();
                }
                accepted
            }
        };
        self.touched |= changed;
    }

    pub fn backspace(&mut self) {
        if self.buffer.input_mut().is_some_and(TextInput::backspace) {
            self.buffer.recoerce();
            self.touched = true;
        }
    }

    pub fn delete(&mut self) {
        if self.buffer.input_mut().is_some_and(TextInput::delete) {
            self.buffer.recoerce();
            self.touched = true;
        }
    }

    /// Left arrow: moves the text cursor, or steps a choice backwards.
    pub fn left(&mut self) {
        match self.buffer.input_mut() {
            Some(input) => input.left(),
            None => self.step(false),
        }
    }

    /// Right arrow: moves the text cursor, or steps a choice forwards.
    pub fn right(&mut self) {
        match self.buffer.input_mut() {
            Some(input) => input.right(),
            None => self.step(true),
        }
    }

    pub fn home(&mut self) {
        if let Some(input) = self.buffer.input_mut() {
            input.home();
        }
    }

    pub fn end(&mut self) {
        if let Some(input) = self.buffer.input_mut() {
            input.end();
        }
    }

    /// Flip a boolean or cycle a select (wrapping). No effect on text buffers.
    pub fn step(&mut self, forward: bool) {
        match &mut self.buffer {
            EditBuffer::Boolean(b) => *b = !*b,
            EditBuffer::Select { options, index } => {
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
            EditBuffer::Text(_) | EditBuffer::Number { .. } => return,
        }
        self.touched = true;
    }

    /// Leave Edit keeping the buffer. Returns the target cell and the value to
    /// store, or `None` when the buffer was never changed or has nothing
    /// committable.
    pub fn commit(self) -> Option<(CellRef, Value)> {
        if !self.touched {
            return None;
        }
        let value = self.buffer.value()?;
        Some((self.cell, value))
    }

    /// Leave Edit discarding the buffer.
    pub fn cancel(self) -> CellRef {
        self.cell
    }
}
