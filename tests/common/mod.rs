//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::{Arc, Once};

pub use entitystore::testing::{FlakyStore, RowCorruptionTester};
pub use entitystore::{
    chunk_column, chunk_count_column, Cell, Entity, EntityState, EntityStoreConfig, EntityTable,
    Error, InMemoryTableStore, KeyBuilder, Properties, RetryConfig, RetryingStore, Row, RowKey,
    Schema, SchemaDefinition, SlugId, SlugIdArray, StoreError, TableStore, TypeRegistry, Value,
};

/// Table used by every suite
pub const TABLE: &str = "items";

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; set RUST_LOG to see it
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Item schema
// ============================================================================

/// `{ id: String, name: String, data: SlugIdArray }`, keyed by id and name
pub fn item_schema() -> Arc<Schema> {
    Schema::configure(
        SchemaDefinition::new(1)
            .partition_key(KeyBuilder::string_key("id"))
            .row_key(KeyBuilder::string_key("name"))
            .property("id", "String")
            .property("name", "String")
            .property("data", "SlugIdArray"),
        &TypeRegistry::builtin(),
    )
    .expect("item schema is valid")
}

/// Key properties of an item
pub fn item_keys(id: &str, name: &str) -> Properties {
    let mut props = Properties::new();
    props.insert("id".to_string(), Value::from(id));
    props.insert("name".to_string(), Value::from(name));
    props
}

/// All properties of an item
pub fn item(id: &str, name: &str, data: SlugIdArray) -> Properties {
    let mut props = item_keys(id, name);
    props.insert("data".to_string(), Value::from(data));
    props
}

/// `n` random identifiers
pub fn random_array(n: usize) -> SlugIdArray {
    (0..n).map(|_| SlugId::v4()).collect()
}

// ============================================================================
// Tables
// ============================================================================

/// Item table on a fresh in-memory store, table already created
pub async fn item_table() -> (Arc<InMemoryTableStore>, EntityTable) {
    init_tracing();
    let store = Arc::new(InMemoryTableStore::new());
    let table = EntityTable::new(store.clone(), TABLE, item_schema());
    table.ensure_table().await.expect("ensure table");
    (store, table)
}

/// Stored row of `entity`
pub async fn raw_row(store: &InMemoryTableStore, entity: &Entity) -> Row {
    store
        .read_row(TABLE, entity.key())
        .await
        .expect("read row")
        .expect("row exists")
        .row
}

/// Value of the chunk count column of `property`
pub fn chunk_count(row: &Row, property: &str) -> i32 {
    match row.get(&chunk_count_column(property)) {
        Some(Cell::Int32(n)) => *n,
        other => panic!("bad chunk count column: {:?}", other),
    }
}
