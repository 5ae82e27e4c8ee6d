//! Row selection by column/value equality.

use crate::error::Result;
use crate::table::{CellValue, Table};

/// Equality predicate: rows whose `column` equals `value`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub value: CellValue,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        FilterSpec {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Indices of the rows of `table` that satisfy this predicate.
    pub fn matching_rows(&self, table: &Table) -> Result<Vec<usize>> {
        let col = table.require_column(&self.column)?;
        Ok(table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row[col] == self.value)
            .map(|(idx, _)| idx)
            .collect())
    }
}

/// Rows of `table` where `row[column] == value`, in their original order.
///
/// No match yields an empty table with the same header. A column that is not
/// part of the table fails with `InvalidColumn`.
pub fn apply(table: &Table, column: &str, value: &CellValue) -> Result<Table> {
    table.filter(&FilterSpec::new(column, value.clone()))
}

impl Table {
    /// See [`apply`].
    pub fn filter(&self, spec: &FilterSpec) -> Result<Table> {
        let rows = spec
            .matching_rows(self)?
            .into_iter()
            .map(|idx| self.rows()[idx].clone())
            .collect();
        let subset = self.with_rows(rows);
        tracing::debug!(
            column = %spec.column,
            value = %spec.value,
            matched = subset.len(),
            total = self.len(),
            "filtered table"
        );
        Ok(subset)
    }
}
