//! The interaction surface: one store, three triggers.
//!
//! Every trigger starts from a fresh [`TableStore::load`], so the backing file
//! stays the single source of truth. Updates are applied to the full table,
//! saved in full, and the file is read back before returning.

use crate::error::Result;
use crate::export::{DEFAULT_EXPORT_SHEET, export_xlsx};
use crate::filter::FilterSpec;
use crate::mutate::UpdateSet;
use crate::storage::TableStore;
use crate::table::{CellValue, Table};

/// Result of a submitted change.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    /// The full table as reloaded after the save.
    pub table: Table,
    /// Rows that matched the filter.
    pub affected: usize,
}

/// Drives load/filter/update/save cycles against a [`TableStore`].
pub struct Editor<S> {
    store: S,
    export_sheet_name: String,
}

impl<S: TableStore> Editor<S> {
    pub fn new(store: S) -> Self {
        Editor {
            store,
            export_sheet_name: DEFAULT_EXPORT_SHEET.to_string(),
        }
    }

    pub fn with_export_sheet_name(mut self, name: &str) -> Self {
        self.export_sheet_name = name.to_string();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Load the full table.
    pub fn load(&self) -> Result<Table> {
        self.store.load()
    }

    /// Rows where `column` equals `value`.
    pub fn select_filter(&self, column: &str, value: &CellValue) -> Result<Table> {
        self.store
            .load()?
            .filter(&FilterSpec::new(column, value.clone()))
    }

    /// Apply `updates` to every row where `column` equals `value`, save, reload.
    pub fn submit_updates(
        &mut self,
        column: &str,
        value: &CellValue,
        updates: &UpdateSet,
    ) -> Result<Submission> {
        let filter = FilterSpec::new(column, value.clone());
        let mut table = self.store.load()?;
        let affected = table.apply_updates(updates, &filter)?;
        self.store.save(&table)?;
        let table = self.store.load()?;
        tracing::info!(column, value = %value, affected, "submitted changes");
        Ok(Submission { table, affected })
    }

    /// The full current table as xlsx bytes.
    pub fn request_export(&self) -> Result<Vec<u8>> {
        let table = self.store.load()?;
        export_xlsx(&table, &self.export_sheet_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetfillError;
    use crate::export::read_xlsx_bytes;
    use crate::storage::{MemoryStore, XlsxStore};

    fn sample() -> Table {
        Table::from_rows(
            vec!["id".into(), "name".into(), "qty".into()],
            vec![
                vec![1i64.into(), "A".into(), CellValue::Empty],
                vec![2i64.into(), "B".into(), "5".into()],
            ],
        )
    }

    #[test]
    fn test_select_filter() {
        let editor = Editor::new(MemoryStore::new(sample()));
        let subset = editor.select_filter("id", &CellValue::Number(1.0)).unwrap();
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.get(0, "name"), Some(&CellValue::text("A")));
    }

    #[test]
    fn test_select_filter_invalid_column() {
        let editor = Editor::new(MemoryStore::new(sample()));
        let err = editor
            .select_filter("missing_col", &CellValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(err, SheetfillError::InvalidColumn { .. }));
        assert!(!err.is_storage());
    }

    #[test]
    fn test_submit_updates_saves_full_table() {
        let mut editor = Editor::new(MemoryStore::new(sample()));
        let updates = UpdateSet::new().with("qty", "3");
        let submission = editor
            .submit_updates("id", &CellValue::Number(1.0), &updates)
            .unwrap();

        assert_eq!(submission.affected, 1);
        assert_eq!(submission.table.len(), 2);
        assert_eq!(submission.table.get(0, "qty"), Some(&CellValue::text("3")));
        assert_eq!(submission.table.get(1, "qty"), Some(&CellValue::text("5")));
        assert_eq!(editor.store().saves(), 1);
        assert_eq!(editor.load().unwrap(), submission.table);
    }

    #[test]
    fn test_submit_invalid_column_does_not_save() {
        let mut editor = Editor::new(MemoryStore::new(sample()));
        let updates = UpdateSet::new().with("bogus", "3");
        assert!(
            editor
                .submit_updates("id", &CellValue::Number(1.0), &updates)
                .is_err()
        );
        assert_eq!(editor.store().saves(), 0);
        assert_eq!(editor.load().unwrap(), sample());
    }

    #[test]
    fn test_submit_overwrites_filled_and_empty_cells() {
        let mut table = sample();
        table.push_row(vec![1i64.into(), "C".into(), CellValue::Number(4.0)]);
        let mut editor = Editor::new(MemoryStore::new(table));
        let updates = UpdateSet::new().with("qty", 9.0);
        let submission = editor
            .submit_updates("id", &CellValue::Number(1.0), &updates)
            .unwrap();
        assert_eq!(submission.affected, 2);
        assert_eq!(submission.table.get(0, "qty"), Some(&CellValue::Number(9.0)));
        assert_eq!(submission.table.get(2, "qty"), Some(&CellValue::Number(9.0)));
    }

    #[test]
    fn test_request_export_matches_store() {
        let editor = Editor::new(MemoryStore::new(sample())).with_export_sheet_name("Données");
        let bytes = editor.request_export().unwrap();
        assert_eq!(read_xlsx_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_cycle_against_xlsx_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bd.xlsx");
        let mut store = XlsxStore::new(&path);
        store.save(&sample()).unwrap();

        let mut editor = Editor::new(store);
        let updates = UpdateSet::new().with("qty", 3.0);
        editor
            .submit_updates("name", &CellValue::text("A"), &updates)
            .unwrap();

        let reloaded = XlsxStore::new(&path).load().unwrap();
        assert_eq!(reloaded.get(0, "qty"), Some(&CellValue::Number(3.0)));
        assert_eq!(reloaded.get(1, "qty"), Some(&CellValue::text("5")));
    }

    #[test]
    fn test_missing_file_surfaces_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = Editor::new(XlsxStore::new(dir.path().join("absent.xlsx")));
        let err = editor
            .submit_updates("id", &CellValue::Number(1.0), &UpdateSet::new())
            .unwrap_err();
        assert!(err.is_storage());
    }
}
