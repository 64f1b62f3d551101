//! Entity engine for entitystore
//!
//! This crate turns typed records into rows of the table store:
//! - TypeHandler / TypeRegistry: per-type validate, serialize, deserialize
//! - Schema: versioned property declarations and key builders
//! - Entity: persisted record with change tracking and its ETag
//! - EntityTable: create, load, save and reload with optimistic concurrency
//! - EntityStoreConfig: `entitystore.toml` settings
//!
//! The engine is the only component that knows about:
//! - The row layout (Version column, chunk count and chunk columns)
//! - Mapping store failures onto entity errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod entity;
pub mod keys;
pub mod schema;
pub mod table;
pub mod types;

pub use config::{EntityStoreConfig, RetrySettings, CONFIG_FILE_NAME};
pub use entity::{Entity, EntityState, Properties};
pub use keys::{decode_key, encode_key, KeyBuilder};
pub use schema::{Property, Schema, SchemaDefinition, VERSION_COLUMN};
pub use table::EntityTable;
pub use types::{chunk_column, chunk_count_column, TypeHandler, TypeRegistry};
