use std::collections::HashMap;

use super::{check_shape, validate_table, Ledger, Result};

/// Ledger kept entirely in memory. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    tables: HashMap<String, Vec<Vec<String>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &str) -> &[Vec<String>] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Ledger for MemoryLedger {
    fn read(&self, table: &str) -> Result<Option<Vec<String>>> {
        validate_table(table)?;
        Ok(self.rows(table).last().cloned())
    }

    fn write(&mut self, table: &str, row: &[String]) -> Result<()> {
        validate_table(table)?;
        let rows = self.tables.entry(table.to_string()).or_default();
        check_shape(table, rows, row)?;
        rows.push(row.to_vec());
        Ok(())
    }

    fn row_count(&self, table: &str) -> Result<usize> {
        validate_table(table)?;
        Ok(self.rows(table).len())
    }
}
