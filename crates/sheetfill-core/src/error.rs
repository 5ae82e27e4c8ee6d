//! Error types for Sheetfill core.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or write a backing spreadsheet.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Failed to encode workbook: {0}")]
    Encode(String),

    #[error("{} contains no sheets", path.display())]
    NoSheets { path: PathBuf },

    #[error("{} has no header row", path.display())]
    EmptySheet { path: PathBuf },

    #[error("Malformed {} at line {line}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Errors that can occur in Sheetfill
#[derive(Error, Debug)]
pub enum SheetfillError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Unknown column: {column}")]
    InvalidColumn { column: String },
}

impl SheetfillError {
    pub(crate) fn invalid_column(column: &str) -> Self {
        SheetfillError::InvalidColumn {
            column: column.to_string(),
        }
    }

    /// True for failures of the backing file rather than of the request.
    pub fn is_storage(&self) -> bool {
        matches!(self, SheetfillError::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, SheetfillError>;
