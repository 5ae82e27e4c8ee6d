//! Applying column updates to the rows matched by a filter.

use crate::error::{Result, SheetfillError};
use crate::filter::FilterSpec;
use crate::table::{CellValue, Table};

/// Ordered column -> value assignments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateSet {
    entries: Vec<(String, CellValue)>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `column`, replacing an earlier assignment of the same column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every column against `table` so nothing is written on failure.
    fn resolve(&self, table: &Table) -> Result<Vec<(usize, &CellValue)>> {
        self.entries
            .iter()
            .map(|(column, value)| {
                table
                    .column_index(column)
                    .map(|col| (col, value))
                    .ok_or_else(|| SheetfillError::invalid_column(column))
            })
            .collect()
    }
}

impl<C: Into<String>, V: Into<CellValue>> FromIterator<(C, V)> for UpdateSet {
    fn from_iter<T: IntoIterator<Item = (C, V)>>(iter: T) -> Self {
        let mut updates = UpdateSet::new();
        for (column, value) in iter {
            updates.set(column, value);
        }
        updates
    }
}

/// Set `row[k] = v` for every `(k, v)` in `updates` on every row where
/// `row[column] == value`; returns the whole table.
pub fn apply_updates(
    mut table: Table,
    updates: &UpdateSet,
    column: &str,
    value: &CellValue,
) -> Result<Table> {
    table.apply_updates(updates, &FilterSpec::new(column, value.clone()))?;
    Ok(table)
}

impl Table {
    /// In-place form of [`apply_updates`]. Returns the number of rows matched.
    ///
    /// Rows are selected before any cell is written, so updating the filter
    /// column does not change which rows this call touches.
    pub fn apply_updates(&mut self, updates: &UpdateSet, filter: &FilterSpec) -> Result<usize> {
        let matched = filter.matching_rows(self)?;
        let targets: Vec<(usize, CellValue)> = updates
            .resolve(self)?
            .into_iter()
            .map(|(col, v)| (col, v.clone()))
            .collect();

        let rows = self.rows_mut();
        for &idx in &matched {
            let row = &mut rows[idx];
            for (col, value) in &targets {
                row[*col] = value.clone();
            }
        }

        tracing::debug!(
            column = %filter.column,
            value = %filter.value,
            rows = matched.len(),
            updates = targets.len(),
            "applied updates"
        );
        Ok(matched.len())
    }
}
