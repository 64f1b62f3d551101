//! Table store abstraction
//!
//! This trait is the whole contract the entity engine relies on. A
//! production implementation talks to a remote column store over the
//! network; [`InMemoryTableStore`](crate::InMemoryTableStore) is the
//! reference implementation used in tests.
//!
//! Every method is a single row-level request. Implementations must make
//! each write atomic for the whole row: a reader sees either all columns
//! of a write or none of them.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::row::{ETag, Row, RowKey, StoredRow};

/// Row storage with conditional writes
///
/// Thread safety: All methods must be safe to call concurrently
/// (requires Send + Sync).
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Create `table` if it does not exist
    ///
    /// Idempotent: succeeds when the table already exists.
    async fn create_table_if_not_exists(&self, table: &str) -> StoreResult<()>;

    /// Insert a new row
    ///
    /// # Errors
    /// `RowAlreadyExists` if a row is stored under `key`.
    async fn insert_row(&self, table: &str, key: &RowKey, row: Row) -> StoreResult<ETag>;

    /// Read all columns of a row
    ///
    /// Returns `None` if no row is stored under `key`.
    async fn read_row(&self, table: &str, key: &RowKey) -> StoreResult<Option<StoredRow>>;

    /// Replace a row, conditional on its ETag
    ///
    /// Columns absent from `row` are removed.
    ///
    /// # Errors
    /// `RowNotFound` if the row is missing, `PreconditionFailed` if `etag`
    /// is not the row's current ETag.
    async fn update_row(
        &self,
        table: &str,
        key: &RowKey,
        row: Row,
        etag: &ETag,
    ) -> StoreResult<ETag>;
}

#[async_trait]
impl<T: TableStore + ?Sized> TableStore for std::sync::Arc<T> {
    async fn create_table_if_not_exists(&self, table: &str) -> StoreResult<()> {
        (**self).create_table_if_not_exists(table).await
    }

    async fn insert_row(&self, table: &str, key: &RowKey, row: Row) -> StoreResult<ETag> {
        (**self).insert_row(table, key, row).await
    }

    async fn read_row(&self, table: &str, key: &RowKey) -> StoreResult<Option<StoredRow>> {
        (**self).read_row(table, key).await
    }

    async fn update_row(
        &self,
        table: &str,
        key: &RowKey,
        row: Row,
        etag: &ETag,
    ) -> StoreResult<ETag> {
        (**self).update_row(table, key, row, etag).await
    }
}
