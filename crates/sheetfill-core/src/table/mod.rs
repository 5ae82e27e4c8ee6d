//! In-memory table model.

mod cell;
mod table;

pub use cell::CellValue;
pub use table::{Row, Table, normalize_headers};
