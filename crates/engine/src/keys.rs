//! Key builders
//!
//! A key builder derives the partition key or row key of an entity from
//! its properties. Derived keys are escaped so that the store's reserved
//! characters (`/ \ # ?`, control characters) never appear raw and `~`
//! stays free for use as the composite separator.
//!
//! Escaping keeps ASCII letters, digits and `- _ . * ' ( )` as they are and
//! writes every other UTF-8 byte as `!` followed by two uppercase hex
//! digits. The empty string is encoded as `!`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use entitystore_core::{Error, Result, Value};

use crate::schema::Schema;

/// Separator between the parts of a composite key
pub const COMPOSITE_SEPARATOR: char = '~';

/// How a key is derived from an entity's properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBuilder {
    /// String form of one property
    StringKey(String),
    /// Fixed key shared by every entity
    ConstantKey(String),
    /// String forms of several properties joined with `~`
    CompositeKey(Vec<String>),
}

impl KeyBuilder {
    /// Key from a single property
    pub fn string_key(property: impl Into<String>) -> Self {
        KeyBuilder::StringKey(property.into())
    }

    /// Constant key
    pub fn constant_key(key: impl Into<String>) -> Self {
        KeyBuilder::ConstantKey(key.into())
    }

    /// Key from several properties, in order
    pub fn composite_key<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyBuilder::CompositeKey(properties.into_iter().map(Into::into).collect())
    }

    /// Properties this key is derived from
    pub fn properties(&self) -> &[String] {
        match self {
            KeyBuilder::StringKey(p) => std::slice::from_ref(p),
            KeyBuilder::ConstantKey(_) => &[],
            KeyBuilder::CompositeKey(ps) => ps,
        }
    }

    /// Derive the encoded key from `values`
    ///
    /// # Errors
    /// `InvalidValue` if a referenced property is missing or has no string
    /// form.
    pub fn build(&self, schema: &Schema, values: &BTreeMap<String, Value>) -> Result<String> {
        match self {
            KeyBuilder::ConstantKey(key) => Ok(encode_key(key)),
            KeyBuilder::StringKey(property) => {
                Ok(encode_key(&key_part(schema, property, values)?))
            }
            KeyBuilder::CompositeKey(properties) => {
                let mut key = String::new();
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        key.push(COMPOSITE_SEPARATOR);
                    }
                    key.push_str(&encode_key(&key_part(schema, property, values)?));
                }
                Ok(key)
            }
        }
    }
}

fn key_part(schema: &Schema, property: &str, values: &BTreeMap<String, Value>) -> Result<String> {
    let value = values
        .get(property)
        .ok_or_else(|| Error::invalid_value(property, "key property is missing"))?;
    let handler = schema
        .property(property)
        .ok_or_else(|| Error::Schema(format!("key property '{}' is not declared", property)))?
        .handler();
    handler.validate(property, value)?;
    handler
        .key_string(value)
        .ok_or_else(|| Error::invalid_value(property, "value has no key form"))
}

/// Escape `raw` for use as a partition or row key
pub fn encode_key(raw: &str) -> String {
    if raw.is_empty() {
        return "!".to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => {
                let _ = write!(out, "!{:02X}", byte);
            }
        }
    }
    out
}

/// Reverse [`encode_key`]
///
/// # Errors
/// `InvalidValue` if `encoded` is not a valid escaped key.
pub fn decode_key(encoded: &str) -> Result<String> {
    if encoded == "!" {
        return Ok(String::new());
    }
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'!' {
            let hex = encoded
                .get(i + 1..i + 3)
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| Error::invalid_value("key", format!("bad escape in '{}'", encoded)))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| Error::invalid_value("key", e.to_string()))
}
