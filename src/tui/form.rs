//! Fill/edit forms shown over the grid.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sheetfill_core::{CellValue, UpdateSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    /// One field per column with empty cells among the matching rows.
    Fill,
    /// One field per column, prefilled from the first matching row.
    Edit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormField {
    pub column: String,
    /// Text the field started with.
    pub original: String,
    pub buffer: String,
    /// Cursor position within buffer (byte offset)
    pub cursor: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    pub fn new(kind: FormKind, fields: Vec<(String, String)>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(column, original)| FormField {
                column,
                cursor: original.len(),
                buffer: original.clone(),
                original,
            })
            .collect();
        Form {
            kind,
            fields,
            focus: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Fill => " Fill missing values ",
            FormKind::Edit => " Edit matching rows ",
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            handle_text_input(&mut field.buffer, &mut field.cursor, key);
        }
    }

    /// The assignments this form submits.
    ///
    /// Fill forms skip blank fields; edit forms skip fields left unchanged,
    /// so untouched cells keep their type.
    pub fn updates(&self) -> UpdateSet {
        self.fields
            .iter()
            .filter(|field| match self.kind {
                FormKind::Fill => !field.buffer.is_empty(),
                FormKind::Edit => field.buffer != field.original,
            })
            .map(|field| (field.column.as_str(), CellValue::from_input(&field.buffer)))
            .collect()
    }
}

/// Handle text editing operations on a buffer with UTF-8 aware cursor movement.
pub fn handle_text_input(buffer: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Left => {
            if *cursor > 0 {
                let mut new_pos = *cursor - 1;
                while new_pos > 0 && !buffer.is_char_boundary(new_pos) {
                    new_pos -= 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Right => {
            if *cursor < buffer.len() {
                let mut new_pos = *cursor + 1;
                while new_pos < buffer.len() && !buffer.is_char_boundary(new_pos) {
                    new_pos += 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buffer.len(),
        KeyCode::Backspace => {
            if *cursor > 0 {
                let mut del_start = *cursor - 1;
                while del_start > 0 && !buffer.is_char_boundary(del_start) {
                    del_start -= 1;
                }
                buffer.drain(del_start..*cursor);
                *cursor = del_start;
            }
        }
        KeyCode::Delete => {
            if *cursor < buffer.len() {
                let mut del_end = *cursor + 1;
                while del_end < buffer.len() && !buffer.is_char_boundary(del_end) {
                    del_end += 1;
                }
                buffer.drain(*cursor..del_end);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.drain(..*cursor);
            *cursor = 0;
        }
        KeyCode::Char(c) => {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                buffer.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
        }
        _ => {}
    }
}
