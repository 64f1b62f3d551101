//! InMemoryTableStore: reference implementation of the store contract
//!
//! This module implements [`TableStore`] using:
//! - `HashMap<RowKey, Entry>` per table
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for monotonically increasing ETag versions
//!
//! # Limits
//!
//! The same limits as the remote store are enforced so that the chunking
//! layer is exercised for real:
//! - every String/Binary column is at most [`MAX_CELL_BYTES`]
//! - a row holds at most [`MAX_COLUMNS`] columns and [`MAX_ROW_BYTES`] bytes
//!
//! A write is validated in full before the row map is touched, so a
//! rejected write leaves no partial state behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use entitystore_core::MAX_CELL_BYTES;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::row::{ETag, Row, RowKey, StoredRow};
use crate::traits::TableStore;

/// Maximum number of user columns per row
pub const MAX_COLUMNS: usize = 252;

/// Maximum total payload of a row (1 MiB)
pub const MAX_ROW_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
struct Entry {
    row: Row,
    version: u64,
}

type Table = Arc<RwLock<HashMap<RowKey, Entry>>>;

/// In-memory table store
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: RwLock<HashMap<String, Table>>,
    /// Global version counter used to mint ETags
    version: AtomicU64,
}

impl InMemoryTableStore {
    /// Create a store with no tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in `table`, `None` if the table does not exist
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.read().get(table).map(|t| t.read().len())
    }

    /// Replace a row without any precondition, keeping its ETag
    ///
    /// Bypasses validation; used to simulate external tampering in tests.
    pub fn overwrite_raw(&self, table: &str, key: &RowKey, row: Row) -> StoreResult<()> {
        let table = self.table(table)?;
        let mut rows = table.write();
        let entry = rows.get_mut(key).ok_or(StoreError::RowNotFound)?;
        entry.row = row;
        Ok(())
    }

    fn table(&self, name: &str) -> StoreResult<Table> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn etag(version: u64) -> ETag {
        ETag::new(format!("W/\"{}\"", version))
    }

    fn validate(row: &Row) -> StoreResult<()> {
        if row.len() > MAX_COLUMNS {
            return Err(StoreError::RowTooLarge(format!(
                "{} columns, limit is {}",
                row.len(),
                MAX_COLUMNS
            )));
        }
        let mut total = 0;
        for (column, cell) in row {
            let size = cell.payload_len();
            if size > MAX_CELL_BYTES {
                return Err(StoreError::CellTooLarge {
                    column: column.clone(),
                    size,
                    max: MAX_CELL_BYTES,
                });
            }
            total += column.len() + size;
        }
        if total > MAX_ROW_BYTES {
            return Err(StoreError::RowTooLarge(format!(
                "{} bytes, limit is {}",
                total, MAX_ROW_BYTES
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn create_table_if_not_exists(&self, table: &str) -> StoreResult<()> {
        self.tables
            .write()
            .entry(table.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(HashMap::new())));
        Ok(())
    }

    async fn insert_row(&self, table: &str, key: &RowKey, row: Row) -> StoreResult<ETag> {
        Self::validate(&row)?;
        let table = self.table(table)?;
        let mut rows = table.write();
        if rows.contains_key(key) {
            return Err(StoreError::RowAlreadyExists);
        }
        let version = self.next_version();
        rows.insert(key.clone(), Entry { row, version });
        Ok(Self::etag(version))
    }

    async fn read_row(&self, table: &str, key: &RowKey) -> StoreResult<Option<StoredRow>> {
        let table = self.table(table)?;
        let rows = table.read();
        Ok(rows.get(key).map(|entry| StoredRow {
            row: entry.row.clone(),
            etag: Self::etag(entry.version),
        }))
    }

    async fn update_row(
        &self,
        table: &str,
        key: &RowKey,
        row: Row,
        etag: &ETag,
    ) -> StoreResult<ETag> {
        Self::validate(&row)?;
        let table = self.table(table)?;
        let mut rows = table.write();
        let entry = rows.get_mut(key).ok_or(StoreError::RowNotFound)?;
        if Self::etag(entry.version) != *etag {
            return Err(StoreError::PreconditionFailed);
        }
        let version = self.next_version();
        *entry = Entry { row, version };
        Ok(Self::etag(version))
    }
}
