//! Testing utilities for the store collaborator
//!
//! This module provides tools for testing the layers above the store:
//!
//! - **Faults**: a wrapper that injects transport failures
//! - **Corruption**: direct row tampering that bypasses ETags and limits
//!
//! # Example
//!
//! ```ignore
//! use entitystore_storage::testing::{FlakyStore, RowCorruptionTester};
//!
//! let flaky = FlakyStore::new(InMemoryTableStore::new());
//! flaky.fail_next(2, StoreError::transport(503, "busy"));
//!
//! let tester = RowCorruptionTester::new(&store, "items");
//! tester.remove_column(&key, "__buf1_data").await?;
//! ```

mod corruption;
mod faults;

pub use corruption::RowCorruptionTester;
pub use faults::FlakyStore;
