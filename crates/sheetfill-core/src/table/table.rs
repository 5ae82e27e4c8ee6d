use super::CellValue;
use crate::error::{Result, SheetfillError};
use std::collections::HashSet;

/// A data row, positionally aligned with [`Table::columns`].
pub type Row = Vec<CellValue>;

/// Ordered rows sharing one ordered set of column names.
///
/// Cells are stored positionally, so every row has exactly one cell per column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given header.
    ///
    /// Names go through [`normalize_headers`], so column names are always
    /// unique and non-blank.
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns: normalize_headers(columns),
            rows: Vec::new(),
        }
    }

    /// Build a table from a header and rows (see [`Table::push_row`]).
    pub fn from_rows<I>(columns: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
    {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row. Short rows are padded with [`CellValue::Empty`];
    /// cells beyond the column count are dropped.
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Resolve a column name, failing with `InvalidColumn` if it is absent.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| SheetfillError::invalid_column(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Cell at `row` in the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Distinct non-empty values of a column, in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Result<Vec<CellValue>> {
        let col = self.require_column(column)?;
        let mut values: Vec<CellValue> = Vec::new();
        for row in &self.rows {
            let value = &row[col];
            if !value.is_empty() && !values.contains(value) {
                values.push(value.clone());
            }
        }
        Ok(values)
    }

    /// Columns that have at least one empty cell, in column order.
    pub fn missing_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(col, _)| self.rows.iter().any(|row| row[*col].is_empty()))
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// Interpret typed text as a value of `column`.
    ///
    /// Text matching the display form of one of the column's existing values
    /// resolves to that value (so "1" finds the number 1 and "007" the code
    /// "007"); anything else is parsed with [`CellValue::from_input`].
    pub fn resolve_value(&self, column: &str, input: &str) -> Result<CellValue> {
        let existing = self.distinct_values(column)?;
        if let Some(value) = existing.iter().find(|v| v.to_string() == input) {
            return Ok(value.clone());
        }
        Ok(CellValue::from_input(input))
    }

    /// A table with the same header and the given rows.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Table {
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// Make raw header cells usable as column names: blank names become
/// `Unnamed: <index>` and repeated names get `.1`, `.2`, ... suffixes.
pub fn normalize_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let raw: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}
