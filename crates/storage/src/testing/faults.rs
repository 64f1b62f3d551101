//! Transport fault injection

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::row::{ETag, Row, RowKey, StoredRow};
use crate::traits::TableStore;

/// Store wrapper that fails a configurable number of upcoming requests
///
/// Every request counts towards [`calls`](FlakyStore::calls), including the
/// failed ones.
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    pending: Mutex<Option<(usize, StoreError)>>,
    lost: Mutex<Option<StoreError>>,
    calls: AtomicUsize,
}

impl<S: TableStore> FlakyStore<S> {
    /// Wrap `inner` with no faults scheduled
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: Mutex::new(None),
            lost: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the next `count` requests with `error`
    pub fn fail_next(&self, count: usize, error: StoreError) {
        *self.pending.lock() = Some((count, error));
    }

    /// Let the next request reach the inner store, then report `error`
    ///
    /// Simulates a write that landed but whose response never arrived.
    pub fn lose_next_response(&self, error: StoreError) {
        *self.lost.lock() = Some(error);
    }

    /// Requests seen so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Borrow the wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn deliver<T>(&self, outcome: StoreResult<T>) -> StoreResult<T> {
        match self.lost.lock().take() {
            Some(error) => Err(error),
            None => outcome,
        }
    }

    fn inject(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut pending = self.pending.lock();
        match pending.as_mut() {
            Some((remaining, error)) if *remaining > 0 => {
                *remaining -= 1;
                Err(error.clone())
            }
            _ => {
                *pending = None;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<S: TableStore> TableStore for FlakyStore<S> {
    async fn create_table_if_not_exists(&self, table: &str) -> StoreResult<()> {
        self.inject()?;
        let outcome = self.inner.create_table_if_not_exists(table).await;
        self.deliver(outcome)
    }

    async fn insert_row(&self, table: &str, key: &RowKey, row: Row) -> StoreResult<ETag> {
        self.inject()?;
        let outcome = self.inner.insert_row(table, key, row).await;
        self.deliver(outcome)
    }

    async fn read_row(&self, table: &str, key: &RowKey) -> StoreResult<Option<StoredRow>> {
        self.inject()?;
        let outcome = self.inner.read_row(table, key).await;
        self.deliver(outcome)
    }

    async fn update_row(
        &self,
        table: &str,
        key: &RowKey,
        row: Row,
        etag: &ETag,
    ) -> StoreResult<ETag> {
        self.inject()?;
        let outcome = self.inner.update_row(table, key, row, etag).await;
        self.deliver(outcome)
    }
}
