//! Spreadsheet backing files (first sheet only).
//!
//! Reading goes through calamine, so xlsx, xlsm, xlsb, xls and ods files all
//! load. Writing produces xlsx through rust_xlsxwriter and is only allowed for
//! `.xlsx`/`.xlsm` paths, since calamine picks its reader from the extension.

use super::{DEFAULT_SHEET_NAME, TableStore};
use crate::error::{Result, StorageError};
use crate::table::{CellValue, Row, Table, normalize_headers};
use calamine::{Data, Range, Reader, Xlsx, open_workbook_auto};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Extensions whose files calamine reads with the xlsx parser.
const WRITABLE_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// A table stored as the first sheet of a spreadsheet file.
#[derive(Clone, Debug)]
pub struct XlsxStore {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        XlsxStore {
            path: path.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }

    /// Name given to the sheet when the file is written.
    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = name.to_string();
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

impl TableStore for XlsxStore {
    fn load(&self) -> Result<Table> {
        std::fs::metadata(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut workbook = open_workbook_auto(&self.path).map_err(|e| StorageError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    message: e.to_string(),
                }
                .into());
            }
            None => {
                return Err(StorageError::NoSheets {
                    path: self.path.clone(),
                }
                .into());
            }
        };

        let table = table_from_range(&self.path, &range)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "loaded spreadsheet"
        );
        Ok(table)
    }

    fn save(&mut self, table: &Table) -> Result<()> {
        if !is_writable_path(&self.path) {
            tracing::warn!(path = %self.path.display(), "refusing to write xlsx content");
            return Err(StorageError::Write {
                path: self.path.clone(),
                message: "only .xlsx and .xlsm files can be saved; convert the file to xlsx first"
                    .to_string(),
            }
            .into());
        }

        let bytes = encode_workbook(table, &self.sheet_name).map_err(|e| StorageError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, bytes).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), rows = table.len(), "saved spreadsheet");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

fn is_writable_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| WRITABLE_EXTENSIONS.iter().any(|w| e.eq_ignore_ascii_case(w)))
}

/// Serialize a table to an in-memory xlsx workbook with a single sheet:
/// header row, then data rows. Empty cells are left unwritten.
pub(crate) fn encode_workbook(
    table: &Table,
    sheet_name: &str,
) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, sheet_col(col)?, name)?;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let sheet_row = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, value) in row.iter().enumerate() {
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(sheet_row, sheet_col(col)?, s)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(sheet_row, sheet_col(col)?, *n)?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

fn sheet_col(col: usize) -> std::result::Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

/// Read the first sheet of an in-memory xlsx workbook.
pub(crate) fn decode_workbook(bytes: &[u8]) -> Result<Table> {
    let source = Path::new("<memory>");
    let mut workbook = Xlsx::new(Cursor::new(bytes)).map_err(|e| StorageError::Read {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => table_from_range(source, &range),
        Some(Err(e)) => Err(StorageError::Read {
            path: source.to_path_buf(),
            message: e.to_string(),
        }
        .into()),
        None => Err(StorageError::NoSheets {
            path: source.to_path_buf(),
        }
        .into()),
    }
}

/// The first row of the used range is the header; every following row is data.
fn table_from_range(path: &Path, range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(StorageError::EmptySheet {
            path: path.to_path_buf(),
        }
        .into());
    };

    let columns = normalize_headers(header.iter().map(|cell| cell_value(cell).to_string()));
    let mut table = Table::new(columns);
    for row in rows {
        let cells: Row = row.iter().map(cell_value).collect();
        table.push_row(cells);
    }
    Ok(table)
}

/// Map a calamine cell onto the closed [`CellValue`] set.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::text(format_datetime(datetime)),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::text(e.to_string()),
    }
}

/// ISO-8601, dropping the time part when it is midnight.
fn format_datetime(datetime: chrono::NaiveDateTime) -> String {
    use chrono::Timelike;

    if datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
