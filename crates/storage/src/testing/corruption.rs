//! Row corruption testing utilities
//!
//! Simulates rows damaged outside the engine's control so that decoding
//! paths can be tested for corruption detection.
//!
//! # Corruption Types
//!
//! - Missing column: a chunk disappears
//! - Replaced column: a count or payload holds an unexpected value

use crate::error::{StoreError, StoreResult};
use crate::in_memory::InMemoryTableStore;
use crate::row::{Cell, RowKey};
use crate::traits::TableStore;

/// Tampers with rows of one table in an [`InMemoryTableStore`]
pub struct RowCorruptionTester<'a> {
    store: &'a InMemoryTableStore,
    table: String,
}

impl<'a> RowCorruptionTester<'a> {
    /// Create a tester for `table`
    pub fn new(store: &'a InMemoryTableStore, table: impl Into<String>) -> Self {
        RowCorruptionTester {
            store,
            table: table.into(),
        }
    }

    /// Delete `column` from the row, returning its previous value
    pub async fn remove_column(&self, key: &RowKey, column: &str) -> StoreResult<Option<Cell>> {
        let mut row = self.current(key).await?;
        let removed = row.remove(column);
        self.store.overwrite_raw(&self.table, key, row)?;
        Ok(removed)
    }

    /// Set `column` to `cell`, returning its previous value
    pub async fn set_column(
        &self,
        key: &RowKey,
        column: &str,
        cell: Cell,
    ) -> StoreResult<Option<Cell>> {
        let mut row = self.current(key).await?;
        let previous = row.insert(column.to_string(), cell);
        self.store.overwrite_raw(&self.table, key, row)?;
        Ok(previous)
    }

    async fn current(&self, key: &RowKey) -> StoreResult<crate::row::Row> {
        self.store
            .read_row(&self.table, key)
            .await?
            .map(|stored| stored.row)
            .ok_or(StoreError::RowNotFound)
    }
}
