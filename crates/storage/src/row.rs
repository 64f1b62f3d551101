//! Physical row model of the table store
//!
//! A row is addressed by a [`RowKey`] (partition key + row key) and holds
//! a flat set of typed columns. Every successful write produces a new
//! [`ETag`]; conditional updates must present the ETag of the last read.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Typed column value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// UTF-8 string
    String(String),
    /// 32-bit integer
    Int32(i32),
    /// 64-bit integer
    Int64(i64),
    /// 64-bit float
    Double(f64),
    /// Boolean
    Boolean(bool),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// Raw bytes
    Binary(Vec<u8>),
}

impl Cell {
    /// Payload size counted against the cell limit
    pub fn payload_len(&self) -> usize {
        match self {
            Cell::String(s) => s.len(),
            Cell::Binary(b) => b.len(),
            Cell::Int32(_) => 4,
            Cell::Int64(_) | Cell::Double(_) | Cell::DateTime(_) => 8,
            Cell::Boolean(_) => 1,
        }
    }

    /// Column type name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Cell::String(_) => "String",
            Cell::Int32(_) => "Int32",
            Cell::Int64(_) => "Int64",
            Cell::Double(_) => "Double",
            Cell::Boolean(_) => "Boolean",
            Cell::DateTime(_) => "DateTime",
            Cell::Binary(_) => "Binary",
        }
    }
}

/// Column name to value
pub type Row = BTreeMap<String, Cell>;

/// Composite identity of a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    /// Partition key
    pub partition_key: String,
    /// Row key within the partition
    pub row_key: String,
}

impl RowKey {
    /// Create a row key
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.partition_key, self.row_key)
    }
}

/// Opaque concurrency token issued by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    /// Wrap a store-issued token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row contents together with the ETag they were read at
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Columns
    pub row: Row,
    /// Token to present on the next conditional update
    pub etag: ETag,
}
