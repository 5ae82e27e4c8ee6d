use super::TableStore;
use crate::error::Result;
use crate::table::Table;

/// Store that keeps the "file" in memory. Loads return a fresh copy.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    table: Table,
    saves: usize,
}

impl MemoryStore {
    pub fn new(table: Table) -> Self {
        MemoryStore { table, saves: 0 }
    }

    /// Number of completed saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl TableStore for MemoryStore {
    fn load(&self) -> Result<Table> {
        Ok(self.table.clone())
    }

    fn save(&mut self, table: &Table) -> Result<()> {
        self.table = table.clone();
        self.saves += 1;
        Ok(())
    }
}
