//! Export of the current table as a downloadable xlsx byte stream.

use crate::error::{Result, StorageError};
use crate::storage::{decode_workbook, encode_workbook};
use crate::table::Table;

/// Sheet name used for exports unless configured otherwise.
pub const DEFAULT_EXPORT_SHEET: &str = "Data";

/// Serialize `table` as a single-sheet xlsx workbook (header row then data
/// rows, no formatting). Does not touch any backing file.
pub fn export_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>> {
    let bytes = encode_workbook(table, sheet_name)
        .map_err(|e| StorageError::Encode(e.to_string()))?;
    tracing::debug!(rows = table.len(), bytes = bytes.len(), sheet = sheet_name, "exported table");
    Ok(bytes)
}

/// Read the first sheet of xlsx bytes (for example an export) back into a table.
pub fn read_xlsx_bytes(bytes: &[u8]) -> Result<Table> {
    decode_workbook(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

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
    fn test_export_reloads_to_same_table() {
        let bytes = export_xlsx(&sample(), DEFAULT_EXPORT_SHEET).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert_eq!(read_xlsx_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_export_invalid_sheet_name() {
        let err = export_xlsx(&sample(), "bad[name]").unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_read_garbage_bytes() {
        assert!(read_xlsx_bytes(b"nope").unwrap_err().is_storage());
    }
}
