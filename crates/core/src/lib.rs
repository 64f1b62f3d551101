//! Core types for entitystore
//!
//! This crate defines the foundational types used throughout the system:
//! - SlugId: 128-bit identifier with binary and URL-safe text encodings
//! - SlugIdArray: ordered identifiers backed by one contiguous buffer
//! - Chunk: bounded fragment of a serialized value, with split/join
//! - Value: property value enum for all built-in types
//! - Limits: per-column size limit of the backing store
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod error;
pub mod limits;
pub mod slugid;
pub mod slugid_array;
pub mod value;

pub use chunk::Chunk;
pub use error::{Error, Result};
pub use limits::{DEFAULT_CHUNK_SIZE, MAX_CELL_BYTES};
pub use slugid::{SlugId, SLUGID_BYTES, SLUGID_TEXT_LEN};
pub use slugid_array::SlugIdArray;
pub use value::Value;
