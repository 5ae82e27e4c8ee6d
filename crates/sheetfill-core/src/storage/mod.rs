//! Backing-file storage: the [`TableStore`] seam and its implementations.

mod csv;
mod md;
mod memory;
mod xlsx;

pub use csv::{CsvStore, write_csv_content};
pub use md::write_markdown_content;
pub use memory::MemoryStore;
pub use xlsx::XlsxStore;
pub(crate) use xlsx::{decode_workbook, encode_workbook};

use crate::error::Result;
use crate::table::Table;
use std::path::{Path, PathBuf};

/// Sheet name used when writing a backing xlsx file.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Loads and saves a whole table. These are the only two operations that
/// touch the backing file; implementations keep no table state between calls.
pub trait TableStore {
    /// Read the full table from the backing file.
    fn load(&self) -> Result<Table>;

    /// Overwrite the backing file with `table`.
    fn save(&mut self, table: &Table) -> Result<()>;

    /// Location of the backing file, if there is one.
    fn path(&self) -> Option<&Path> {
        None
    }
}

impl<S: TableStore + ?Sized> TableStore for Box<S> {
    fn load(&self) -> Result<Table> {
        (**self).load()
    }

    fn save(&mut self, table: &Table) -> Result<()> {
        (**self).save(table)
    }

    fn path(&self) -> Option<&Path> {
        (**self).path()
    }
}

/// Options for [`open_store`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Sheet name given to the table when an xlsx file is written.
    pub sheet_name: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

/// Pick a store for `path` by extension: `.csv` is read and written as
/// comma-separated text, everything else through the spreadsheet codec.
pub fn open_store(path: impl Into<PathBuf>, options: &StoreOptions) -> Box<dyn TableStore> {
    let path = path.into();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvStore::new(path))
    } else {
        Box::new(XlsxStore::new(path).with_sheet_name(&options.sheet_name))
    }
}
