//! Application state and logic.
//!
//! The [`App`] keeps the last loaded table, the current filter selection and
//! the open form, if any. All changes go through the [`Editor`], which reloads
//! the file after every save.

use sheetfill_core::{CellValue, Editor, FilterSpec, Table, TableStore};
use std::fs;
use std::path::PathBuf;

use super::form::{Form, FormKind};

/// Rows moved by PageUp/PageDown
const PAGE_ROWS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Pick the filter column/value and browse the matching rows.
    Browse,
    /// A fill or edit form is open.
    Form,
}

pub struct App {
    pub editor: Editor<Box<dyn TableStore>>,
    pub export_file: PathBuf,
    pub table: Table,
    pub column_idx: usize,
    /// Distinct non-empty values of the filter column.
    pub values: Vec<CellValue>,
    pub value_idx: usize,
    /// Rows of `table` matching the current filter.
    pub filtered: Table,
    pub row_offset: usize,
    pub mode: Mode,
    pub form: Option<Form>,
    pub status_message: String,
}

impl App {
    pub fn new(
        editor: Editor<Box<dyn TableStore>>,
        export_file: PathBuf,
    ) -> sheetfill_core::Result<Self> {
        let table = editor.load()?;
        let mut app = App {
            editor,
            export_file,
            filtered: Table::new(table.columns().to_vec()),
            table,
            column_idx: 0,
            values: Vec::new(),
            value_idx: 0,
            row_offset: 0,
            mode: Mode::Browse,
            form: None,
            status_message: String::new(),
        };
        app.refresh_values(None);
        Ok(app)
    }

    pub fn filter_column(&self) -> Option<&str> {
        self.table
            .columns()
            .get(self.column_idx)
            .map(String::as_str)
    }

    pub fn filter_value(&self) -> Option<&CellValue> {
        self.values.get(self.value_idx)
    }

    /// Recompute the value list for the current column, keeping `keep`
    /// selected when it is still present.
    fn refresh_values(&mut self, keep: Option<CellValue>) {
        self.values = match self.filter_column() {
            Some(column) => self.table.distinct_values(column).unwrap_or_default(),
            None => Vec::new(),
        };
        self.value_idx = keep
            .and_then(|value| self.values.iter().position(|v| *v == value))
            .unwrap_or(0);
        self.refresh_filter();
    }

    fn refresh_filter(&mut self) {
        let filtered = match (self.filter_column(), self.filter_value()) {
            (Some(column), Some(value)) => self
                .table
                .filter(&FilterSpec::new(column, value.clone()))
                .ok(),
            _ => None,
        };
        self.filtered = filtered.unwrap_or_else(|| Table::new(self.table.columns().to_vec()));
        self.row_offset = 0;
    }

    pub fn cycle_column(&mut self, delta: isize) {
        let count = self.table.columns().len();
        if count == 0 {
            return;
        }
        self.column_idx = wrap(self.column_idx, delta, count);
        self.status_message.clear();
        self.refresh_values(None);
    }

    pub fn cycle_value(&mut self, delta: isize) {
        if self.values.is_empty() {
            return;
        }
        self.value_idx = wrap(self.value_idx, delta, self.values.len());
        self.status_message.clear();
        self.refresh_filter();
    }

    pub fn scroll_rows(&mut self, delta: isize) {
        let max = self.filtered.len().saturating_sub(1);
        let step = delta.unsigned_abs() * PAGE_ROWS;
        self.row_offset = if delta < 0 {
            self.row_offset.saturating_sub(step)
        } else {
            (self.row_offset + step).min(max)
        };
    }

    /// Columns with at least one empty cell among the matching rows.
    pub fn missing_columns(&self) -> Vec<String> {
        self.filtered
            .missing_columns()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn open_fill_form(&mut self) {
        if self.filtered.is_empty() {
            self.status_message = "No rows match the current filter".to_string();
            return;
        }
        let missing = self.missing_columns();
        if missing.is_empty() {
            self.status_message = "No missing values in the selected rows".to_string();
            return;
        }
        let fields = missing.into_iter().map(|c| (c, String::new())).collect();
        self.form = Some(Form::new(FormKind::Fill, fields));
        self.mode = Mode::Form;
        self.status_message.clear();
    }

    /// Edit form prefilled from the first matching row.
    pub fn open_edit_form(&mut self) {
        let Some(first) = self.filtered.rows().first() else {
            self.status_message = "No rows match the current filter".to_string();
            return;
        };
        let fields = self
            .filtered
            .columns()
            .iter()
            .zip(first)
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();
        self.form = Some(Form::new(FormKind::Edit, fields));
        self.mode = Mode::Form;
        self.status_message.clear();
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.mode = Mode::Browse;
    }

    /// Submit the open form against the current filter.
    ///
    /// On failure the form stays open with the error in the status bar.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            self.mode = Mode::Browse;
            return;
        };
        let updates = form.updates();
        if updates.is_empty() {
            self.status_message = "Nothing to save".to_string();
            self.mode = Mode::Browse;
            return;
        }
        let (Some(column), Some(value)) = (
            self.filter_column().map(str::to_string),
            self.filter_value().cloned(),
        ) else {
            self.status_message = "Error: no filter selected".to_string();
            self.mode = Mode::Browse;
            return;
        };

        match self.editor.submit_updates(&column, &value, &updates) {
            Ok(submission) => {
                // Follow the rows if the edit changed the filter column itself.
                let keep = updates.get(&column).cloned().unwrap_or(value);
                self.table = submission.table;
                self.clamp_column();
                self.refresh_values(Some(keep));
                self.status_message = format!(
                    "Saved {} row(s) to {}",
                    submission.affected,
                    self.file_label()
                );
                self.mode = Mode::Browse;
            }
            Err(e) => {
                tracing::warn!(error = %e, "submit failed");
                self.status_message = format!("Error: {}", e);
                self.form = Some(form);
            }
        }
    }

    /// Re-read the file, keeping the current selection where possible.
    pub fn reload(&mut self) {
        match self.editor.load() {
            Ok(table) => {
                let column = self.filter_column().map(str::to_string);
                let keep = self.filter_value().cloned();
                self.table = table;
                self.column_idx = column
                    .and_then(|c| self.table.column_index(&c))
                    .unwrap_or(0);
                self.refresh_values(keep);
                self.status_message = format!("Reloaded {}", self.file_label());
            }
            Err(e) => self.status_message = format!("Error: {}", e),
        }
    }

    /// Write the full table to the export file.
    pub fn export(&mut self) {
        let bytes = match self.editor.request_export() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.status_message = format!("Error: {}", e);
                return;
            }
        };
        match fs::write(&self.export_file, bytes) {
            Ok(()) => {
                tracing::info!(path = %self.export_file.display(), "exported");
                self.status_message = format!("Exported to {}", self.export_file.display());
            }
            Err(e) => {
                self.status_message =
                    format!("Error: write {}: {}", self.export_file.display(), e);
            }
        }
    }

    pub fn file_label(&self) -> String {
        match self.editor.store().path() {
            Some(path) => path.display().to_string(),
            None => "[memory]".to_string(),
        }
    }

    fn clamp_column(&mut self) {
        if self.column_idx >= self.table.columns().len() {
            self.column_idx = 0;
        }
    }
}

fn wrap(idx: usize, delta: isize, len: usize) -> usize {
    (idx as isize + delta).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetfill_core::MemoryStore;

    fn sample() -> Table {
        Table::from_rows(
            vec!["city".into(), "qty".into(), "note".into()],
            vec![
                vec!["Paris".into(), CellValue::Number(1.0), CellValue::Empty],
                vec!["Lyon".into(), CellValue::Empty, "ok".into()],
                vec!["Paris".into(), CellValue::Number(3.0), CellValue::Empty],
            ],
        )
    }

    fn app() -> App {
        let store: Box<dyn TableStore> = Box::new(MemoryStore::new(sample()));
        App::new(Editor::new(store), PathBuf::from("unused.xlsx")).unwrap()
    }

    fn type_into(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char(c),
                crossterm::event::KeyModifiers::NONE,
            ));
        }
    }

    #[test]
    fn test_initial_filter_is_first_value_of_first_column() {
        let app = app();
        assert_eq!(app.filter_column(), Some("city"));
        assert_eq!(app.filter_value(), Some(&CellValue::text("Paris")));
        assert_eq!(app.filtered.len(), 2);
    }

    #[test]
    fn test_cycle_value_and_column() {
        let mut app = app();
        app.cycle_value(1);
        assert_eq!(app.filter_value(), Some(&CellValue::text("Lyon")));
        assert_eq!(app.filtered.len(), 1);
        app.cycle_value(1);
        assert_eq!(app.filter_value(), Some(&CellValue::text("Paris")));

        app.cycle_column(-1);
        assert_eq!(app.filter_column(), Some("note"));
        assert_eq!(app.values, vec![CellValue::text("ok")]);
    }

    #[test]
    fn test_fill_form_lists_missing_columns_and_saves() {
        let mut app = app();
        app.open_fill_form();
        assert_eq!(app.mode, Mode::Form);
        let form = app.form.as_mut().unwrap();
        let columns: Vec<_> = form.fields.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["note"]);
        type_into(form, "checked");

        app.submit_form();
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.status_message.starts_with("Saved 2 row(s)"));
        assert!(app.missing_columns().is_empty());
        assert_eq!(app.table.get(1, "note"), Some(&CellValue::text("ok")));
    }

    #[test]
    fn test_fill_form_writes_every_matching_row() {
        let table = Table::from_rows(
            vec!["city".into(), "qty".into()],
            vec![
                vec!["Paris".into(), CellValue::Number(4.0)],
                vec!["Paris".into(), CellValue::Empty],
                vec!["Lyon".into(), CellValue::Empty],
            ],
        );
        let store: Box<dyn TableStore> = Box::new(MemoryStore::new(table));
        let mut app = App::new(Editor::new(store), PathBuf::from("unused.xlsx")).unwrap();

        app.open_fill_form();
        type_into(app.form.as_mut().unwrap(), "9");
        app.submit_form();

        assert_eq!(app.table.get(0, "qty"), Some(&CellValue::Number(9.0)));
        assert_eq!(app.table.get(1, "qty"), Some(&CellValue::Number(9.0)));
        assert_eq!(app.table.get(2, "qty"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_fill_form_not_opened_without_missing_values() {
        let mut app = app();
        app.open_fill_form();
        type_into(app.form.as_mut().unwrap(), "x");
        app.submit_form();

        app.open_fill_form();
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.status_message, "No missing values in the selected rows");
    }

    #[test]
    fn test_edit_of_filter_column_follows_rows() {
        let mut app = app();
        app.open_edit_form();
        let form = app.form.as_mut().unwrap();
        assert_eq!(form.fields[0].buffer, "Paris");
        form.fields[0].buffer = "Nice".to_string();

        app.submit_form();
        assert_eq!(app.filter_value(), Some(&CellValue::text("Nice")));
        assert_eq!(app.filtered.len(), 2);
        // Untouched fields keep their number type
        assert_eq!(app.filtered.get(1, "qty"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_unchanged_edit_saves_nothing() {
        let mut app = app();
        app.open_edit_form();
        app.submit_form();
        assert_eq!(app.status_message, "Nothing to save");
        assert_eq!(app.mode, Mode::Browse);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.export_file = dir.path().join("out.xlsx");
        app.export();
        assert!(app.status_message.starts_with("Exported to"));
        let bytes = fs::read(&app.export_file).unwrap();
        let table = sheetfill_core::read_xlsx_bytes(&bytes).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_empty_table() {
        let store: Box<dyn TableStore> = Box::new(MemoryStore::new(Table::new(vec!["a".into()])));
        let mut app = App::new(Editor::new(store), PathBuf::from("x.xlsx")).unwrap();
        assert_eq!(app.filter_value(), None);
        app.open_edit_form();
        assert_eq!(app.mode, Mode::Browse);
        app.cycle_value(1);
        app.cycle_column(1);
        assert_eq!(app.filter_column(), Some("a"));
    }
}
