pub mod json_backend;
pub mod memory;

use crate::errors::LedgerError;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Row-oriented persistence for logged records.
///
/// Rows are appended to named tables; only the last row of a table is ever
/// read back.
pub trait Ledger {
    /// Last row of `table`, or `None` when the table is missing or empty.
    fn read(&self, table: &str) -> Result<Option<Vec<String>>>;

    /// Appends `row` to `table`, creating the table on first write.
    fn write(&mut self, table: &str, row: &[String]) -> Result<()>;

    /// Number of rows stored in `table`.
    fn row_count(&self, table: &str) -> Result<usize>;
}

/// Table names become file names, so they are restricted to a safe alphabet.
pub(crate) fn validate_table(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidTable(table.to_string()))
    }
}

/// Tables keep a fixed width once their first row is written.
pub(crate) fn check_shape(table: &str, rows: &[Vec<String>], row: &[String]) -> Result<()> {
    match rows.first() {
        Some(first) if first.len() != row.len() => Err(LedgerError::RowShape {
            table: table.to_string(),
            expected: first.len(),
            actual: row.len(),
        }),
        _ => Ok(()),
    }
}

pub use json_backend::JsonLedger;
pub use memory::MemoryLedger;
