//! sheetfill-core - UI-agnostic table model, filtering, updates and storage.

pub mod editor;
pub mod error;
pub mod export;
pub mod filter;
pub mod mutate;
pub mod storage;
pub mod table;

pub use editor::{Editor, Submission};
pub use error::{Result, SheetfillError, StorageError};
pub use export::{DEFAULT_EXPORT_SHEET, export_xlsx, read_xlsx_bytes};
pub use filter::FilterSpec;
pub use mutate::UpdateSet;
pub use storage::{CsvStore, MemoryStore, StoreOptions, TableStore, XlsxStore, open_store};
pub use table::{CellValue, Row, Table};
