//! Retry configuration and the retrying store wrapper
//!
//! Transient transport failures (timeouts, throttling, 5xx) are retried
//! here, below the entity engine, with bounded exponential backoff.
//! Semantic outcomes such as `RowAlreadyExists` or `PreconditionFailed`
//! are never retried.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::row::{ETag, Row, RowKey, StoredRow};
use crate::traits::TableStore;

// ============================================================================
// Retry Configuration
// ============================================================================

/// Configuration for transport retry behavior
///
/// # Example
/// ```ignore
/// let config = RetryConfig {
///     max_retries: 5,
///     base_delay_ms: 10,
///     max_delay_ms: 200,
/// };
/// let store = RetryingStore::new(inner, config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries)
    pub max_retries: usize,
    /// Base delay between retries in milliseconds (exponential backoff)
    pub base_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryConfig {
    /// Create a new RetryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a RetryConfig with no retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set maximum number of retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set base delay for exponential backoff
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Set maximum delay between retries
    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Calculate delay for a given attempt (exponential backoff)
    pub fn calculate_delay(&self, attempt: usize) -> Duration {
        // Cap the shift to prevent overflow (1 << 63 is the max for u64)
        let shift = attempt.min(63);
        let multiplier = 1u64 << shift;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.calculate_delay(attempt);
                    warn!(
                        target: "entitystore::store",
                        operation = what,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying store request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

// ============================================================================
// Retrying Store
// ============================================================================

/// Wraps a store and retries its transient transport failures
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner: S,
    config: RetryConfig,
}

impl<S: TableStore> RetryingStore<S> {
    /// Wrap `inner`
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Retry policy in effect
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Borrow the wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: TableStore> TableStore for RetryingStore<S> {
    async fn create_table_if_not_exists(&self, table: &str) -> StoreResult<()> {
        self.config
            .run("create_table", || self.inner.create_table_if_not_exists(table))
            .await
    }

    async fn insert_row(&self, table: &str, key: &RowKey, row: Row) -> StoreResult<ETag> {
        let mut attempts = 0usize;
        let outcome = self
            .config
            .run("insert_row", || {
                attempts += 1;
                self.inner.insert_row(table, key, row.clone())
            })
            .await;
        match outcome {
            // An earlier attempt may have landed with its response lost.
            // The row is ours only if it holds exactly what was sent.
            Err(StoreError::RowAlreadyExists) if attempts > 1 => {
                match self.read_row(table, key).await? {
                    Some(stored) if stored.row == row => {
                        debug!(
                            target: "entitystore::store",
                            key = %key,
                            attempts,
                            "retried insert had already landed"
                        );
                        Ok(stored.etag)
                    }
                    _ => Err(StoreError::RowAlreadyExists),
                }
            }
            other => other,
        }
    }

    async fn read_row(&self, table: &str, key: &RowKey) -> StoreResult<Option<StoredRow>> {
        self.config
            .run("read_row", || self.inner.read_row(table, key))
            .await
    }

    async fn update_row(
        &self,
        table: &str,
        key: &RowKey,
        row: Row,
        etag: &ETag,
    ) -> StoreResult<ETag> {
        self.config
            .run("update_row", || self.inner.update_row(table, key, row.clone(), etag))
            .await
    }
}
