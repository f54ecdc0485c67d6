use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::utils::paths::{ensure_dir, PathResolver};

use super::{check_shape, validate_table, Ledger, Result};

const TABLE_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// On-disk form of one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFile {
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Ledger storing each table as `<book dir>/<table>.json`.
#[derive(Debug, Clone)]
pub struct JsonLedger {
    book_dir: PathBuf,
}

impl JsonLedger {
    /// Opens the book named `book` under `base`, creating its directory.
    pub fn open(base: &Path, book: &str) -> Result<Self> {
        let book_dir = PathResolver::book_dir_in(base, book);
        ensure_dir(&book_dir)?;
        tracing::debug!(path = %book_dir.display(), "opened book");
        Ok(Self { book_dir })
    }

    pub fn book_dir(&self) -> &Path {
        &self.book_dir
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.book_dir.join(format!("{}.{}", table, TABLE_EXTENSION))
    }

    fn load_table(&self, table: &str) -> Result<Option<TableFile>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save_table(&self, table: &str, contents: &TableFile) -> Result<()> {
        let path = self.table_path(table);
        let json = serde_json::to_string_pretty(contents)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl Ledger for JsonLedger {
    fn read(&self, table: &str) -> Result<Option<Vec<String>>> {
        validate_table(table)?;
        Ok(self
            .load_table(table)?
            .and_then(|contents| contents.rows.last().cloned()))
    }

    fn write(&mut self, table: &str, row: &[String]) -> Result<()> {
        validate_table(table)?;
        let mut contents = self.load_table(table)?.unwrap_or_else(|| TableFile {
            updated_at: Utc::now(),
            rows: Vec::new(),
        });
        check_shape(table, &contents.rows, row)?;
        contents.rows.push(row.to_vec());
        contents.updated_at = Utc::now();
        self.save_table(table, &contents)?;
        tracing::info!(table, rows = contents.rows.len(), "row written");
        Ok(())
    }

    fn row_count(&self, table: &str) -> Result<usize> {
        validate_table(table)?;
        Ok(self
            .load_table(table)?
            .map(|contents| contents.rows.len())
            .unwrap_or(0))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    tmp.set_extension(format!("{}.{}", TABLE_EXTENSION, TMP_SUFFIX));
    tmp
}

fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()
}
