//! Chunked property types
//!
//! Types whose encoding may exceed a single column are stored as:
//! - `__bufchunks_<name>`: Int32 number of chunks
//! - `__buf<i>_<name>`: Binary payload of chunk `i`, for `i` in `0..count`
//!
//! Concatenating the payloads in index order yields the encoding. An empty
//! encoding is stored as a count of zero and no payload columns.

use std::fmt;

use entitystore_core::chunk::{self, Chunk};
use entitystore_core::{Error, Result, SlugIdArray, Value};
use entitystore_storage::{Cell, Row};

use super::{type_mismatch, TypeHandler};

/// Column holding the chunk count of `property`
pub fn chunk_count_column(property: &str) -> String {
    format!("__bufchunks_{}", property)
}

/// Column holding chunk `index` of `property`
pub fn chunk_column(index: usize, property: &str) -> String {
    format!("__buf{}_{}", index, property)
}

/// Chunk index encoded in `column`, if it is a chunk column of `property`
fn parse_chunk_column(column: &str, property: &str) -> Option<usize> {
    let rest = column.strip_prefix("__buf")?;
    let (index, name) = rest.split_once('_')?;
    if name != property || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok()
}

fn write_chunks(property: &str, bytes: &[u8], max_chunk_size: usize, row: &mut Row) -> Result<()> {
    let chunks = chunk::split(bytes, max_chunk_size)?;
    let count = i32::try_from(chunks.len()).map_err(|_| {
        Error::invalid_value(property, format!("{} chunks is too many", chunks.len()))
    })?;
    row.insert(chunk_count_column(property), Cell::Int32(count));
    for chunk in chunks {
        row.insert(
            chunk_column(chunk.index(), property),
            Cell::Binary(chunk.into_data()),
        );
    }
    Ok(())
}

fn read_chunks(property: &str, row: &Row) -> Result<Vec<u8>> {
    let count_column = chunk_count_column(property);
    let count = match row.get(&count_column) {
        Some(Cell::Int32(n)) if *n >= 0 => *n as usize,
        Some(cell) => {
            return Err(Error::DataCorruption(format!(
                "column '{}' holds invalid chunk count {:?}",
                count_column, cell
            )))
        }
        None => {
            return Err(Error::DataCorruption(format!(
                "column '{}' missing from row",
                count_column
            )))
        }
    };

    // The row holds the count column plus one column per chunk.
    if count >= row.len() {
        return Err(Error::DataCorruption(format!(
            "column '{}' declares {} chunks but the row has {} columns",
            count_column,
            count,
            row.len()
        )));
    }

    let mut chunks = Vec::with_capacity(count);
    for index in 0..count {
        let column = chunk_column(index, property);
        match row.get(&column) {
            Some(Cell::Binary(data)) => chunks.push(Chunk::new(index, data.clone())),
            Some(cell) => {
                return Err(Error::DataCorruption(format!(
                    "column '{}' holds {}, expected Binary",
                    column,
                    cell.kind()
                )))
            }
            None => {}
        }
    }
    if row.contains_key(&chunk_column(count, property)) {
        return Err(Error::DataCorruption(format!(
            "property '{}' has chunks beyond its declared count {}",
            property, count
        )));
    }
    chunk::join(count, &chunks)
}

// ============================================================================
// Encodings
// ============================================================================

/// Conversion between a value and the byte buffer that gets chunked
pub trait BufferEncoding: Send + Sync + fmt::Debug {
    /// Registered type name
    const NAME: &'static str;

    /// Encode a value of this type, `None` if `value` is another variant
    fn encode(&self, value: &Value) -> Option<Result<Vec<u8>>>;

    /// Decode a joined buffer
    fn decode(&self, bytes: Vec<u8>) -> Result<Value>;

    /// Default value
    fn default_value(&self) -> Value;
}

/// Raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobEncoding;

impl BufferEncoding for BlobEncoding {
    const NAME: &'static str = "Blob";

    fn encode(&self, value: &Value) -> Option<Result<Vec<u8>>> {
        value.as_blob().map(|b| Ok(b.to_vec()))
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<Value> {
        Ok(Value::Blob(bytes))
    }

    fn default_value(&self) -> Value {
        Value::Blob(Vec::new())
    }
}

/// UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEncoding;

impl BufferEncoding for TextEncoding {
    const NAME: &'static str = "Text";

    fn encode(&self, value: &Value) -> Option<Result<Vec<u8>>> {
        match value {
            Value::Text(s) => Some(Ok(s.as_bytes().to_vec())),
            _ => None,
        }
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<Value> {
        String::from_utf8(bytes)
            .map(Value::Text)
            .map_err(|e| Error::DataCorruption(format!("text is not UTF-8: {}", e)))
    }

    fn default_value(&self) -> Value {
        Value::Text(String::new())
    }
}

/// JSON document, stored as compact JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoding;

impl BufferEncoding for JsonEncoding {
    const NAME: &'static str = "JSON";

    fn encode(&self, value: &Value) -> Option<Result<Vec<u8>>> {
        value
            .as_json()
            .map(|j| serde_json::to_vec(j).map_err(Error::from))
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<Value> {
        serde_json::from_slice(&bytes)
            .map(Value::Json)
            .map_err(|e| Error::DataCorruption(format!("stored JSON is invalid: {}", e)))
    }

    fn default_value(&self) -> Value {
        Value::Json(serde_json::Value::Null)
    }
}

/// Concatenated 16-byte identifier records
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugIdArrayEncoding;

impl BufferEncoding for SlugIdArrayEncoding {
    const NAME: &'static str = "SlugIdArray";

    fn encode(&self, value: &Value) -> Option<Result<Vec<u8>>> {
        value
            .as_slug_id_array()
            .map(|a| Ok(a.as_bytes().to_vec()))
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<Value> {
        SlugIdArray::from_bytes(bytes).map(Value::SlugIdArray)
    }

    fn default_value(&self) -> Value {
        Value::SlugIdArray(SlugIdArray::new())
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Type handler for any [`BufferEncoding`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Chunked<E> {
    encoding: E,
}

impl<E: BufferEncoding> Chunked<E> {
    /// Wrap an encoding
    pub fn new(encoding: E) -> Self {
        Self { encoding }
    }
}

impl<E: BufferEncoding> TypeHandler for Chunked<E> {
    fn name(&self) -> &'static str {
        E::NAME
    }

    fn validate(&self, property: &str, value: &Value) -> Result<()> {
        match self.encoding.encode(value) {
            Some(Ok(_)) => Ok(()),
            Some(Err(e)) => Err(Error::invalid_value(property, e.to_string())),
            None => Err(type_mismatch(property, E::NAME, value)),
        }
    }

    fn serialize(
        &self,
        property: &str,
        value: &Value,
        max_chunk_size: usize,
        row: &mut Row,
    ) -> Result<()> {
        let bytes = self
            .encoding
            .encode(value)
            .ok_or_else(|| type_mismatch(property, E::NAME, value))??;
        write_chunks(property, &bytes, max_chunk_size, row)
    }

    fn deserialize(&self, property: &str, row: &Row) -> Result<Value> {
        self.encoding.decode(read_chunks(property, row)?)
    }

    fn columns(&self, property: &str, row: &Row) -> Vec<String> {
        let count_column = chunk_count_column(property);
        row.keys()
            .filter(|column| {
                **column == count_column || parse_chunk_column(column, property).is_some()
            })
            .cloned()
            .collect()
    }

    fn default_value(&self) -> Value {
        self.encoding.default_value()
    }
}
