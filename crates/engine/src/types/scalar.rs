//! Single-column property types
//!
//! Each scalar property occupies exactly one column named after the
//! property.

use chrono::{DateTime, Utc};
use entitystore_core::{Error, Result, SlugId, Value, MAX_CELL_BYTES};
use entitystore_storage::{Cell, Row};

use super::{type_mismatch, TypeHandler};

fn column<'a>(property: &str, row: &'a Row) -> Result<&'a Cell> {
    row.get(property).ok_or_else(|| {
        Error::DataCorruption(format!("column '{}' missing from row", property))
    })
}

fn wrong_cell(property: &str, expected: &str, cell: &Cell) -> Error {
    Error::DataCorruption(format!(
        "column '{}' holds {}, expected {}",
        property,
        cell.kind(),
        expected
    ))
}

/// Short UTF-8 string, also usable as a key
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl TypeHandler for StringType {
    fn name(&self) -> &'static str {
        "String"
    }

    fn validate(&self, property: &str, value: &Value) -> Result<()> {
        match value {
            Value::String(s) if s.len() > MAX_CELL_BYTES => Err(Error::invalid_value(
                property,
                format!(
                    "string of {} bytes exceeds the {} byte column limit, use Text",
                    s.len(),
                    MAX_CELL_BYTES
                ),
            )),
            Value::String(_) => Ok(()),
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn serialize(&self, property: &str, value: &Value, _: usize, row: &mut Row) -> Result<()> {
        match value {
            Value::String(s) => {
                row.insert(property.to_string(), Cell::String(s.clone()));
                Ok(())
            }
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn deserialize(&self, property: &str, row: &Row) -> Result<Value> {
        match column(property, row)? {
            Cell::String(s) => Ok(Value::String(s.clone())),
            cell => Err(wrong_cell(property, "String", cell)),
        }
    }

    fn columns(&self, property: &str, _row: &Row) -> Vec<String> {
        vec![property.to_string()]
    }

    fn default_value(&self) -> Value {
        Value::String(String::new())
    }

    fn key_string(&self, value: &Value) -> Option<String> {
        value.as_str().map(str::to_string)
    }

    fn is_key_type(&self) -> bool {
        true
    }
}

/// 64-bit float
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberType;

impl TypeHandler for NumberType {
    fn name(&self) -> &'static str {
        "Number"
    }

    fn validate(&self, property: &str, value: &Value) -> Result<()> {
        match value {
            Value::Number(n) if !n.is_finite() => {
                Err(Error::invalid_value(property, "number must be finite"))
            }
            Value::Number(_) => Ok(()),
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn serialize(&self, property: &str, value: &Value, _: usize, row: &mut Row) -> Result<()> {
        match value {
            Value::Number(n) => {
                row.insert(property.to_string(), Cell::Double(*n));
                Ok(())
            }
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn deserialize(&self, property: &str, row: &Row) -> Result<Value> {
        match column(property, row)? {
            Cell::Double(n) => Ok(Value::Number(*n)),
            Cell::Int32(n) => Ok(Value::Number(f64::from(*n))),
            cell => Err(wrong_cell(property, "Double", cell)),
        }
    }

    fn columns(&self, property: &str, _row: &Row) -> Vec<String> {
        vec![property.to_string()]
    }

    fn default_value(&self) -> Value {
        Value::Number(0.0)
    }
}

/// Boolean
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl TypeHandler for BooleanType {
    fn name(&self) -> &'static str {
        "Boolean"
    }

    fn validate(&self, property: &str, value: &Value) -> Result<()> {
        match value {
            Value::Boolean(_) => Ok(()),
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn serialize(&self, property: &str, value: &Value, _: usize, row: &mut Row) -> Result<()> {
        match value {
            Value::Boolean(b) => {
                row.insert(property.to_string(), Cell::Boolean(*b));
                Ok(())
            }
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn deserialize(&self, property: &str, row: &Row) -> Result<Value> {
        match column(property, row)? {
            Cell::Boolean(b) => Ok(Value::Boolean(*b)),
            cell => Err(wrong_cell(property, "Boolean", cell)),
        }
    }

    fn columns(&self, property: &str, _row: &Row) -> Vec<String> {
        vec![property.to_string()]
    }

    fn default_value(&self) -> Value {
        Value::Boolean(false)
    }
}

/// UTC timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl TypeHandler for DateType {
    fn name(&self) -> &'static str {
        "Date"
    }

    fn validate(&self, property: &str, value: &Value) -> Result<()> {
        match value {
            Value::Date(_) => Ok(()),
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn serialize(&self, property: &str, value: &Value, _: usize, row: &mut Row) -> Result<()> {
        match value {
            Value::Date(d) => {
                row.insert(property.to_string(), Cell::DateTime(*d));
                Ok(())
            }
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn deserialize(&self, property: &str, row: &Row) -> Result<Value> {
        match column(property, row)? {
            Cell::DateTime(d) => Ok(Value::Date(*d)),
            cell => Err(wrong_cell(property, "DateTime", cell)),
        }
    }

    fn columns(&self, property: &str, _row: &Row) -> Vec<String> {
        vec![property.to_string()]
    }

    fn default_value(&self) -> Value {
        Value::Date(DateTime::<Utc>::default())
    }
}

/// Single identifier, stored as its 16-byte binary form
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugIdType;

impl TypeHandler for SlugIdType {
    fn name(&self) -> &'static str {
        "SlugId"
    }

    fn validate(&self, property: &str, value: &Value) -> Result<()> {
        match value {
            Value::SlugId(_) => Ok(()),
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn serialize(&self, property: &str, value: &Value, _: usize, row: &mut Row) -> Result<()> {
        match value {
            Value::SlugId(id) => {
                row.insert(property.to_string(), Cell::Binary(id.encode().to_vec()));
                Ok(())
            }
            other => Err(type_mismatch(property, self.name(), other)),
        }
    }

    fn deserialize(&self, property: &str, row: &Row) -> Result<Value> {
        match column(property, row)? {
            Cell::Binary(bytes) => SlugId::decode(bytes).map(Value::SlugId).map_err(|e| {
                Error::DataCorruption(format!("column '{}': {}", property, e))
            }),
            cell => Err(wrong_cell(property, "Binary", cell)),
        }
    }

    fn columns(&self, property: &str, _row: &Row) -> Vec<String> {
        vec![property.to_string()]
    }

    fn default_value(&self) -> Value {
        Value::SlugId(SlugId::from_bytes([0; 16]))
    }

    fn key_string(&self, value: &Value) -> Option<String> {
        value.as_slug_id().map(|id| id.to_string())
    }

    fn is_key_type(&self) -> bool {
        true
    }
}
