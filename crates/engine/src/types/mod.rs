//! Property type handlers
//!
//! A [`TypeHandler`] is the capability set of one declared property type:
//! validate, serialize into columns, deserialize from columns, compare,
//! clone, and supply a default value. Handlers are looked up by name in a
//! [`TypeRegistry`] once, when a schema is configured; entity operations
//! then dispatch through the resolved handler without any lookup.
//!
//! ## Built-in Types
//!
//! | Name          | Value variant          | Columns            |
//! |---------------|------------------------|--------------------|
//! | `String`      | `Value::String`        | one String column  |
//! | `Number`      | `Value::Number`        | one Double column  |
//! | `Boolean`     | `Value::Boolean`       | one Boolean column |
//! | `Date`        | `Value::Date`          | one DateTime column|
//! | `SlugId`      | `Value::SlugId`        | one Binary column  |
//! | `Text`        | `Value::Text`          | chunked            |
//! | `JSON`        | `Value::Json`          | chunked            |
//! | `Blob`        | `Value::Blob`          | chunked            |
//! | `SlugIdArray` | `Value::SlugIdArray`   | chunked            |

mod buffer;
mod scalar;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use entitystore_core::{Error, Result, Value};
use entitystore_storage::Row;

pub use buffer::{
    chunk_column, chunk_count_column, BlobEncoding, BufferEncoding, Chunked, JsonEncoding,
    SlugIdArrayEncoding, TextEncoding,
};
pub use scalar::{BooleanType, DateType, NumberType, SlugIdType, StringType};

/// Capability set of a property type
pub trait TypeHandler: Send + Sync + fmt::Debug {
    /// Name the type is registered under
    fn name(&self) -> &'static str;

    /// Check that `value` belongs to this type and fits the store
    fn validate(&self, property: &str, value: &Value) -> Result<()>;

    /// Write the columns for `value` into `row`
    ///
    /// `value` has already passed [`validate`](TypeHandler::validate).
    fn serialize(
        &self,
        property: &str,
        value: &Value,
        max_chunk_size: usize,
        row: &mut Row,
    ) -> Result<()>;

    /// Read the value of `property` back from `row`
    fn deserialize(&self, property: &str, row: &Row) -> Result<Value>;

    /// Names of the columns `property` occupies in `row`
    fn columns(&self, property: &str, row: &Row) -> Vec<String>;

    /// Value used when `create` is not given this property
    fn default_value(&self) -> Value;

    /// Type-aware equality
    fn equals(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    /// Independent deep copy
    fn clone_value(&self, value: &Value) -> Value {
        value.clone()
    }

    /// String form used by key builders, `None` if the type cannot be a key
    fn key_string(&self, _value: &Value) -> Option<String> {
        None
    }

    /// True if properties of this type may be referenced by key builders
    fn is_key_type(&self) -> bool {
        false
    }
}

/// Error for a value of the wrong variant
pub(crate) fn type_mismatch(property: &str, expected: &str, value: &Value) -> Error {
    Error::invalid_value(
        property,
        format!("expected {}, got {}", expected, value.type_name()),
    )
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable map from type name to handler
///
/// Build it once at startup and pass it by reference to
/// [`Schema::configure`](crate::Schema::configure).
#[derive(Clone, Default)]
pub struct TypeRegistry {
    handlers: HashMap<&'static str, Arc<dyn TypeHandler>>,
}

impl TypeRegistry {
    /// Registry with no types
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in type
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        let handlers: [Arc<dyn TypeHandler>; 9] = [
            Arc::new(StringType),
            Arc::new(NumberType),
            Arc::new(BooleanType),
            Arc::new(DateType),
            Arc::new(SlugIdType),
            Arc::new(Chunked::new(TextEncoding)),
            Arc::new(Chunked::new(JsonEncoding)),
            Arc::new(Chunked::new(BlobEncoding)),
            Arc::new(Chunked::new(SlugIdArrayEncoding)),
        ];
        for handler in handlers {
            registry.handlers.insert(handler.name(), handler);
        }
        registry
    }

    /// Add a handler, consuming and returning the registry
    ///
    /// # Errors
    /// `Schema` if a handler with the same name is already registered.
    pub fn with(mut self, handler: Arc<dyn TypeHandler>) -> Result<Self> {
        let name = handler.name();
        if self.handlers.contains_key(name) {
            return Err(Error::Schema(format!("type '{}' registered twice", name)));
        }
        self.handlers.insert(name, handler);
        Ok(self)
    }

    /// Handler registered under `name`
    pub fn get(&self, name: &str) -> Option<Arc<dyn TypeHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}
