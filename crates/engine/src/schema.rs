//! Entity schema declaration and validation
//!
//! A [`SchemaDefinition`] is a plain description: version, key builders
//! and `(name, type name)` pairs. [`Schema::configure`] validates it against
//! a [`TypeRegistry`] and resolves every type name to its handler once,
//! producing the immutable [`Schema`] shared by all entities of the kind.
//!
//! # Example
//!
//! ```ignore
//! let registry = TypeRegistry::builtin();
//! let schema = Schema::configure(
//!     SchemaDefinition::new(1)
//!         .partition_key(KeyBuilder::string_key("id"))
//!         .row_key(KeyBuilder::string_key("name"))
//!         .property("id", "String")
//!         .property("name", "String")
//!         .property("data", "SlugIdArray"),
//!     &registry,
//! )?;
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use entitystore_core::{Error, Result, Value};

use crate::keys::KeyBuilder;
use crate::types::{TypeHandler, TypeRegistry};

/// Column holding the schema version of a row
pub const VERSION_COLUMN: &str = "Version";

/// Column names the store or the engine reserve
const RESERVED_NAMES: [&str; 4] = ["PartitionKey", "RowKey", "Timestamp", VERSION_COLUMN];

/// Unvalidated schema description
#[derive(Debug, Clone, Default)]
pub struct SchemaDefinition {
    version: u32,
    partition_key: Option<KeyBuilder>,
    row_key: Option<KeyBuilder>,
    properties: Vec<(String, String)>,
}

impl SchemaDefinition {
    /// Start a definition for schema `version`
    pub fn new(version: u32) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// Set the partition key builder
    pub fn partition_key(mut self, key: KeyBuilder) -> Self {
        self.partition_key = Some(key);
        self
    }

    /// Set the row key builder
    pub fn row_key(mut self, key: KeyBuilder) -> Self {
        self.row_key = Some(key);
        self
    }

    /// Declare a property of type `type_name`
    pub fn property(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.properties.push((name.into(), type_name.into()));
        self
    }
}

/// A declared property with its resolved handler
#[derive(Clone)]
pub struct Property {
    name: String,
    handler: Arc<dyn TypeHandler>,
}

impl Property {
    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type handler
    pub fn handler(&self) -> &dyn TypeHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &self.handler.name())
            .finish()
    }
}

/// Validated, immutable schema
#[derive(Debug)]
pub struct Schema {
    version: u32,
    partition_key: KeyBuilder,
    row_key: KeyBuilder,
    properties: BTreeMap<String, Property>,
    key_properties: BTreeSet<String>,
}

impl Schema {
    /// Validate `definition` and resolve its types
    ///
    /// # Errors
    /// `Schema` if the version is zero, there are no properties, a name is
    /// empty, reserved or declared twice, a type is not registered, a key
    /// builder is missing, or a key builder references an undeclared
    /// property or one whose type cannot form a key.
    pub fn configure(definition: SchemaDefinition, registry: &TypeRegistry) -> Result<Arc<Schema>> {
        let SchemaDefinition {
            version,
            partition_key,
            row_key,
            properties: declared,
        } = definition;

        if version == 0 {
            return Err(Error::Schema("version must be a positive integer".to_string()));
        }
        if declared.is_empty() {
            return Err(Error::Schema("at least one property is required".to_string()));
        }

        let mut properties = BTreeMap::new();
        for (name, type_name) in declared {
            if name.is_empty() {
                return Err(Error::Schema("property names must be non-empty".to_string()));
            }
            if name.starts_with("__") || RESERVED_NAMES.contains(&name.as_str()) {
                return Err(Error::Schema(format!("property name '{}' is reserved", name)));
            }
            let handler = registry.get(&type_name).ok_or_else(|| {
                Error::Schema(format!(
                    "property '{}' has unknown type '{}'",
                    name, type_name
                ))
            })?;
            if properties.contains_key(&name) {
                return Err(Error::Schema(format!("property '{}' declared twice", name)));
            }
            properties.insert(name.clone(), Property { name, handler });
        }

        let partition_key = partition_key
            .ok_or_else(|| Error::Schema("partition key is not declared".to_string()))?;
        let row_key =
            row_key.ok_or_else(|| Error::Schema("row key is not declared".to_string()))?;

        let mut key_properties = BTreeSet::new();
        for (label, builder) in [("partition key", &partition_key), ("row key", &row_key)] {
            if let KeyBuilder::CompositeKey(parts) = builder {
                if parts.is_empty() {
                    return Err(Error::Schema(format!(
                        "{} composite needs at least one property",
                        label
                    )));
                }
            }
            for name in builder.properties() {
                let property = properties.get(name).ok_or_else(|| {
                    Error::Schema(format!(
                        "{} references undeclared property '{}'",
                        label, name
                    ))
                })?;
                if !property.handler.is_key_type() {
                    return Err(Error::Schema(format!(
                        "{} property '{}' has type {}, which cannot form a key",
                        label,
                        name,
                        property.handler.name()
                    )));
                }
                key_properties.insert(name.clone());
            }
        }

        Ok(Arc::new(Schema {
            version,
            partition_key,
            row_key,
            properties,
            key_properties,
        }))
    }

    /// Schema version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Partition key builder
    pub fn partition_key(&self) -> &KeyBuilder {
        &self.partition_key
    }

    /// Row key builder
    pub fn row_key(&self) -> &KeyBuilder {
        &self.row_key
    }

    /// Declared property `name`
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// All declared properties, ordered by name
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// True if `name` feeds the partition key or row key
    pub fn is_key_property(&self, name: &str) -> bool {
        self.key_properties.contains(name)
    }

    /// Properties feeding either key
    pub fn key_properties(&self) -> impl Iterator<Item = &str> {
        self.key_properties.iter().map(String::as_str)
    }

    /// Deep copy of `values` using each property's handler
    pub(crate) fn clone_values(&self, values: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
        values
            .iter()
            .map(|(name, value)| {
                let copy = match self.property(name) {
                    Some(p) => p.handler().clone_value(value),
                    None => value.clone(),
                };
                (name.clone(), copy)
            })
            .collect()
    }
}
