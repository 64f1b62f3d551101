//! Entity handle
//!
//! An [`Entity`] is one persisted record: its identity, its property
//! values, the columns last written or read, and the ETag issued by the
//! store. The identity and the key properties are fixed once the entity
//! exists; other properties may be edited freely in memory and are only
//! persisted by [`EntityTable::save`](crate::EntityTable::save).
//!
//! ## Lifecycle
//!
//! ```text
//! create/load ──► Created ──edit──► Modified ──save──► Saved
//!                    ▲                  │  ▲              │
//!                    └──────reload──────┘  └─────edit─────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use entitystore_core::{Error, Result, SlugIdArray, Value};
use entitystore_storage::{ETag, Row, RowKey};

use crate::schema::Schema;

/// Property name to value
pub type Properties = BTreeMap<String, Value>;

/// Where an entity stands relative to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Matches the row produced by `create` or read by `load`
    Created,
    /// Holds local edits not yet saved
    Modified,
    /// Matches the row written by the last `save`
    Saved,
}

/// Persisted record of one schema
#[derive(Debug, Clone)]
pub struct Entity {
    schema: Arc<Schema>,
    key: RowKey,
    properties: Properties,
    /// Values as of the last create, load or save
    persisted: Properties,
    /// Columns as of the last create, load or save
    row: Row,
    etag: ETag,
    saved: bool,
}

impl Entity {
    pub(crate) fn from_store(
        schema: Arc<Schema>,
        key: RowKey,
        properties: Properties,
        row: Row,
        etag: ETag,
    ) -> Self {
        let persisted = schema.clone_values(&properties);
        Self {
            schema,
            key,
            properties,
            persisted,
            row,
            etag,
            saved: false,
        }
    }

    /// Record a successful save of `row` under `etag`
    pub(crate) fn mark_saved(&mut self, row: Row, etag: ETag) {
        self.persisted = self.schema.clone_values(&self.properties);
        self.row = row;
        self.etag = etag;
        self.saved = true;
    }

    /// Schema this entity follows
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Schema version
    pub fn version(&self) -> u32 {
        self.schema.version()
    }

    /// Row identity
    pub fn key(&self) -> &RowKey {
        &self.key
    }

    /// Encoded partition key
    pub fn partition_key(&self) -> &str {
        &self.key.partition_key
    }

    /// Encoded row key
    pub fn row_key(&self) -> &str {
        &self.key.row_key
    }

    /// Concurrency token from the last create, load or save
    pub fn etag(&self) -> &ETag {
        &self.etag
    }

    /// Columns as last persisted
    pub(crate) fn row(&self) -> &Row {
        &self.row
    }

    /// All property values
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Value of `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Mutable access to a non-key property
    ///
    /// # Errors
    /// `InvalidOperation` for key properties, `InvalidValue` for names the
    /// schema does not declare.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        self.check_writable(name)?;
        self.properties
            .get_mut(name)
            .ok_or_else(|| Error::invalid_value(name, "property is not set"))
    }

    /// Replace a non-key property, returning the previous value
    ///
    /// # Errors
    /// As for [`get_mut`](Entity::get_mut), plus `InvalidValue` if `value`
    /// does not match the declared type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        self.check_writable(name)?;
        let value = value.into();
        if let Some(property) = self.schema.property(name) {
            property.handler().validate(name, &value)?;
        }
        Ok(self.properties.insert(name.to_string(), value))
    }

    /// Borrow a `SlugIdArray` property
    pub fn slug_id_array(&self, name: &str) -> Option<&SlugIdArray> {
        self.get(name).and_then(Value::as_slug_id_array)
    }

    /// Mutably borrow a `SlugIdArray` property
    pub fn slug_id_array_mut(&mut self, name: &str) -> Result<&mut SlugIdArray> {
        self.get_mut(name)?
            .as_slug_id_array_mut()
            .ok_or_else(|| Error::invalid_value(name, "not a SlugIdArray"))
    }

    /// Names of properties that differ from their persisted values
    pub fn changed_properties(&self) -> Vec<&str> {
        self.schema
            .properties()
            .filter(|property| {
                let name = property.name();
                match (self.properties.get(name), self.persisted.get(name)) {
                    (Some(current), Some(persisted)) => {
                        !property.handler().equals(current, persisted)
                    }
                    (None, None) => false,
                    _ => true,
                }
            })
            .map(|property| property.name())
            .collect()
    }

    /// Current lifecycle state
    pub fn state(&self) -> EntityState {
        if !self.changed_properties().is_empty() {
            EntityState::Modified
        } else if self.saved {
            EntityState::Saved
        } else {
            EntityState::Created
        }
    }

    fn check_writable(&self, name: &str) -> Result<()> {
        if self.schema.property(name).is_none() {
            return Err(Error::invalid_value(name, "property is not declared"));
        }
        if self.schema.is_key_property(name) {
            return Err(Error::InvalidOperation(format!(
                "property '{}' is part of the entity key and cannot change",
                name
            )));
        }
        Ok(())
    }
}
