//! entitystore - typed entities over a column-limited table store
//!
//! Declare a versioned schema, then create, load and save entities
//! without handling serialization or the store's 64 KiB column limit.
//! Large values such as [`SlugIdArray`] are split across chunk columns
//! and reassembled on read.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use entitystore::{
//!     EntityTable, InMemoryTableStore, KeyBuilder, Properties, Schema,
//!     SchemaDefinition, SlugId, SlugIdArray, TypeRegistry, Value,
//! };
//!
//! let schema = Schema::configure(
//!     SchemaDefinition::new(1)
//!         .partition_key(KeyBuilder::string_key("id"))
//!         .row_key(KeyBuilder::string_key("name"))
//!         .property("id", "String")
//!         .property("name", "String")
//!         .property("data", "SlugIdArray"),
//!     &TypeRegistry::builtin(),
//! )?;
//! let table = EntityTable::new(Arc::new(InMemoryTableStore::new()), "items", schema);
//! table.ensure_table().await?;
//!
//! let mut props = Properties::new();
//! props.insert("id".into(), Value::from("a"));
//! props.insert("name".into(), Value::from("first"));
//! props.insert("data".into(), (0..42).map(|_| SlugId::v4()).collect::<SlugIdArray>().into());
//! let entity = table.create(props).await?;
//! ```
//!
//! # Architecture
//!
//! - `entitystore-core`: identifiers, SlugIdArray, chunking, values, errors
//! - `entitystore-storage`: table store contract, in-memory store, retries
//! - `entitystore-engine`: type handlers, schemas, entity CRUD, config

pub use entitystore_core::*;
pub use entitystore_engine::*;
pub use entitystore_storage::{
    Cell, ETag, InMemoryTableStore, RetryConfig, RetryingStore, Row, RowKey, StoreError,
    StoredRow, TableStore,
};

/// Fault injection and row tampering helpers
pub mod testing {
    pub use entitystore_storage::testing::*;
}
