//! Property values
//!
//! This module defines:
//! - Value: one variant per built-in property type
//!
//! ## Type Rules
//!
//! - Each variant belongs to exactly one declared type; there are no
//!   implicit coercions between them.
//! - `String` and `Text` both hold UTF-8 text but are different types:
//!   `String` fits in one column, `Text` is chunked.
//! - `Number` uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`.

use chrono::{DateTime, Utc};

use crate::slugid::SlugId;
use crate::slugid_array::SlugIdArray;

/// Value of a single entity property
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Short UTF-8 string stored in a single column
    String(String),
    /// UTF-8 text of any length, chunked
    Text(String),
    /// 64-bit floating point
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// UTC timestamp
    Date(DateTime<Utc>),
    /// Single identifier
    SlugId(SlugId),
    /// JSON document, chunked
    Json(serde_json::Value),
    /// Raw bytes, chunked
    Blob(Vec<u8>),
    /// Ordered identifiers, chunked
    SlugIdArray(SlugIdArray),
}

impl Value {
    /// Get the type name as a string
    ///
    /// Matches the name the type is registered under.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Text(_) => "Text",
            Value::Number(_) => "Number",
            Value::Boolean(_) => "Boolean",
            Value::Date(_) => "Date",
            Value::SlugId(_) => "SlugId",
            Value::Json(_) => "JSON",
            Value::Blob(_) => "Blob",
            Value::SlugIdArray(_) => "SlugIdArray",
        }
    }

    /// Borrow as a string (`String` or `Text`)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as a timestamp
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get as an identifier
    pub fn as_slug_id(&self) -> Option<SlugId> {
        match self {
            Value::SlugId(id) => Some(*id),
            _ => None,
        }
    }

    /// Borrow as JSON
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }

    /// Borrow as bytes
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow as an identifier array
    pub fn as_slug_id_array(&self) -> Option<&SlugIdArray> {
        match self {
            Value::SlugIdArray(a) => Some(a),
            _ => None,
        }
    }

    /// Mutably borrow as an identifier array
    pub fn as_slug_id_array_mut(&mut self) -> Option<&mut SlugIdArray> {
        match self {
            Value::SlugIdArray(a) => Some(a),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<SlugId> for Value {
    fn from(id: SlugId) -> Self {
        Value::SlugId(id)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<SlugIdArray> for Value {
    fn from(a: SlugIdArray) -> Self {
        Value::SlugIdArray(a)
    }
}
