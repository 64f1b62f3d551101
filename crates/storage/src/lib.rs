//! Storage layer for entitystore
//!
//! This crate defines the contract with the remote table store and ships:
//! - TableStore: async row read/insert/update with ETag preconditions
//! - Row model: Cell, Row, RowKey, ETag, StoredRow
//! - InMemoryTableStore: reference store enforcing the cell and row limits
//! - RetryingStore: bounded exponential backoff for transient failures
//! - testing: fault injection and row tampering helpers
//!
//! # Atomicity
//!
//! Each request touches exactly one row and is atomic for that row. There
//! are no cross-row transactions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod in_memory;
pub mod retry;
pub mod row;
pub mod testing;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use in_memory::{InMemoryTableStore, MAX_COLUMNS, MAX_ROW_BYTES};
pub use retry::{RetryConfig, RetryingStore};
pub use row::{Cell, ETag, Row, RowKey, StoredRow};
pub use traits::TableStore;
