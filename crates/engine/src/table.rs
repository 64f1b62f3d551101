//! Entity CRUD engine
//!
//! [`EntityTable`] binds a schema to one table of the store and turns
//! property maps into rows and back. Every request touches one row, so
//! all chunk columns of a write land atomically.
//!
//! ## Concurrency
//!
//! Updates are optimistic. `create` and `load` hand out the ETag the store
//! issued; `save` presents it as a precondition. If another writer got in
//! first the save fails with `ConcurrencyConflict` and the caller must
//! reload and retry. The engine never retries a conflict on its own.
//! Transient transport failures are the store's concern (see
//! [`RetryingStore`]).

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use entitystore_core::limits::validate_chunk_size;
use entitystore_core::{Error, Result, DEFAULT_CHUNK_SIZE};
use entitystore_storage::{Cell, RetryingStore, Row, RowKey, StoreError, TableStore};

use crate::config::EntityStoreConfig;
use crate::entity::{Entity, Properties};
use crate::schema::{Schema, VERSION_COLUMN};

/// Entities of one schema stored in one table
pub struct EntityTable {
    store: Arc<dyn TableStore>,
    table: String,
    schema: Arc<Schema>,
    max_chunk_size: usize,
}

impl fmt::Debug for EntityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityTable")
            .field("table", &self.table)
            .field("version", &self.schema.version())
            .field("max_chunk_size", &self.max_chunk_size)
            .finish_non_exhaustive()
    }
}

impl EntityTable {
    /// Bind `schema` to `table` on `store`
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self {
            store,
            table: table.into(),
            schema,
            max_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Bind `schema` using the table, chunk size and retry policy of
    /// `config`; `store` is wrapped in a [`RetryingStore`]
    ///
    /// # Errors
    /// `Config` if `config` fails validation.
    pub fn from_config<S>(store: S, config: &EntityStoreConfig, schema: Arc<Schema>) -> Result<Self>
    where
        S: TableStore + 'static,
    {
        config.validate()?;
        let store: Arc<dyn TableStore> =
            Arc::new(RetryingStore::new(store, config.retry_config()));
        Ok(Self::new(store, config.table_name.clone(), schema)
            .with_max_chunk_size(config.max_chunk_size)?)
    }

    /// Use chunks of at most `max_chunk_size` bytes for buffer types
    ///
    /// # Errors
    /// `Config` unless `1 <= max_chunk_size <= 65536`.
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Result<Self> {
        self.max_chunk_size = validate_chunk_size(max_chunk_size)?;
        Ok(self)
    }

    /// Table name
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Bound schema
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Chunk size for buffer types
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Create the table if it does not exist yet
    pub async fn ensure_table(&self) -> Result<()> {
        self.store.create_table_if_not_exists(&self.table).await?;
        info!(target: "entitystore::table", table = %self.table, "Table ready");
        Ok(())
    }

    /// Derive the row identity from key property values
    ///
    /// # Errors
    /// `InvalidValue` if a key property is missing or has the wrong type.
    pub fn identity(&self, values: &Properties) -> Result<RowKey> {
        let partition_key = self.schema.partition_key().build(&self.schema, values)?;
        let row_key = self.schema.row_key().build(&self.schema, values)?;
        Ok(RowKey::new(partition_key, row_key))
    }

    /// Persist a new entity
    ///
    /// Absent non-key properties take their type's default value.
    ///
    /// # Errors
    /// - `InvalidValue` for undeclared names, absent key properties or
    ///   values of the wrong type
    /// - `EntityAlreadyExists` if a row with the same identity exists
    ///
    /// Behind a [`RetryingStore`], an insert that landed but whose response
    /// was lost is recognised on retry by re-reading the row; it succeeds
    /// if the stored columns are exactly the ones written. Over a bare
    /// store such an insert reports `EntityAlreadyExists`.
    pub async fn create(&self, mut properties: Properties) -> Result<Entity> {
        if let Some(name) = properties
            .keys()
            .find(|name| self.schema.property(name).is_none())
        {
            return Err(Error::invalid_value(name.as_str(), "property is not declared"));
        }
        for property in self.schema.properties() {
            let name = property.name();
            match properties.get(name) {
                Some(value) => property.handler().validate(name, value)?,
                None if self.schema.is_key_property(name) => {
                    return Err(Error::invalid_value(name, "key property is missing"));
                }
                None => {
                    properties.insert(name.to_string(), property.handler().default_value());
                }
            }
        }

        let key = self.identity(&properties)?;
        let mut row = Row::new();
        row.insert(VERSION_COLUMN.to_string(), self.version_cell()?);
        for property in self.schema.properties() {
            let name = property.name();
            if let Some(value) = properties.get(name) {
                property
                    .handler()
                    .serialize(name, value, self.max_chunk_size, &mut row)?;
            }
        }

        let etag = self
            .store
            .insert_row(&self.table, &key, row.clone())
            .await
            .map_err(|e| match e {
                StoreError::RowAlreadyExists => Error::EntityAlreadyExists {
                    partition_key: key.partition_key.clone(),
                    row_key: key.row_key.clone(),
                },
                other => other.into(),
            })?;

        debug!(
            target: "entitystore::table",
            table = %self.table,
            key = %key,
            columns = row.len(),
            "Entity created"
        );
        Ok(Entity::from_store(
            Arc::clone(&self.schema),
            key,
            properties,
            row,
            etag,
        ))
    }

    /// Read the entity identified by the key properties in `keys`
    ///
    /// Properties in `keys` that do not feed a key are ignored.
    ///
    /// # Errors
    /// - `EntityNotFound` if no row exists
    /// - `DataCorruption` if the version column or chunk bookkeeping is
    ///   inconsistent
    /// - `Schema` if the row was written under another schema version
    pub async fn load(&self, keys: &Properties) -> Result<Entity> {
        let key = self.identity(keys)?;
        self.read(key).await
    }

    /// Write the changed properties of `entity`
    ///
    /// Unchanged properties keep their stored columns. A save without
    /// changes does not contact the store.
    ///
    /// # Errors
    /// - `ConcurrencyConflict` if the row changed since `entity` was read;
    ///   reload and retry
    /// - `EntityNotFound` if the row is gone
    /// - `InvalidOperation` if `entity` belongs to another schema
    pub async fn save(&self, entity: &mut Entity) -> Result<()> {
        self.check_owned(entity)?;
        let changed: Vec<String> = entity
            .changed_properties()
            .into_iter()
            .map(str::to_string)
            .collect();
        if changed.is_empty() {
            debug!(
                target: "entitystore::table",
                table = %self.table,
                key = %entity.key(),
                "Nothing to save"
            );
            return Ok(());
        }

        let mut row = entity.row().clone();
        for name in &changed {
            let handler = self
                .schema
                .property(name)
                .ok_or_else(|| Error::invalid_value(name.as_str(), "property is not declared"))?
                .handler();
            let value = entity
                .get(name)
                .ok_or_else(|| Error::invalid_value(name.as_str(), "property is not set"))?;
            handler.validate(name, value)?;
            for column in handler.columns(name, &row) {
                row.remove(&column);
            }
            handler.serialize(name, value, self.max_chunk_size, &mut row)?;
        }
        row.insert(VERSION_COLUMN.to_string(), self.version_cell()?);

        let key = entity.key().clone();
        let etag = self
            .store
            .update_row(&self.table, &key, row.clone(), entity.etag())
            .await
            .map_err(|e| match e {
                StoreError::PreconditionFailed => {
                    warn!(
                        target: "entitystore::table",
                        table = %self.table,
                        key = %key,
                        "Concurrency conflict on save"
                    );
                    Error::ConcurrencyConflict {
                        partition_key: key.partition_key.clone(),
                        row_key: key.row_key.clone(),
                    }
                }
                StoreError::RowNotFound => Error::EntityNotFound {
                    partition_key: key.partition_key.clone(),
                    row_key: key.row_key.clone(),
                },
                other => other.into(),
            })?;

        debug!(
            target: "entitystore::table",
            table = %self.table,
            key = %key,
            changed = ?changed,
            "Entity saved"
        );
        entity.mark_saved(row, etag);
        Ok(())
    }

    /// Replace `entity` with the stored state, discarding local edits
    pub async fn reload(&self, entity: &mut Entity) -> Result<()> {
        self.check_owned(entity)?;
        *entity = self.read(entity.key().clone()).await?;
        Ok(())
    }

    async fn read(&self, key: RowKey) -> Result<Entity> {
        let stored = self
            .store
            .read_row(&self.table, &key)
            .await?
            .ok_or_else(|| Error::EntityNotFound {
                partition_key: key.partition_key.clone(),
                row_key: key.row_key.clone(),
            })?;

        match stored.row.get(VERSION_COLUMN) {
            Some(Cell::Int32(v)) if i64::from(*v) == i64::from(self.schema.version()) => {}
            Some(Cell::Int32(v)) => {
                return Err(Error::Schema(format!(
                    "row {} has schema version {}, expected {}",
                    key,
                    v,
                    self.schema.version()
                )));
            }
            _ => {
                warn!(target: "entitystore::table", key = %key, "Version column missing or malformed");
                return Err(Error::DataCorruption(format!(
                    "row {} has no valid {} column",
                    key, VERSION_COLUMN
                )));
            }
        }

        let mut properties = Properties::new();
        for property in self.schema.properties() {
            let name = property.name();
            let value = property
                .handler()
                .deserialize(name, &stored.row)
                .map_err(|e| {
                    if matches!(e, Error::DataCorruption(_)) {
                        warn!(
                            target: "entitystore::table",
                            key = %key,
                            property = name,
                            error = %e,
                            "Corrupt property"
                        );
                    }
                    e
                })?;
            properties.insert(name.to_string(), value);
        }

        debug!(target: "entitystore::table", table = %self.table, key = %key, "Entity loaded");
        Ok(Entity::from_store(
            Arc::clone(&self.schema),
            key,
            properties,
            stored.row,
            stored.etag,
        ))
    }

    fn version_cell(&self) -> Result<Cell> {
        i32::try_from(self.schema.version())
            .map(Cell::Int32)
            .map_err(|_| Error::Schema(format!("version {} does not fit a column", self.schema.version())))
    }

    fn check_owned(&self, entity: &Entity) -> Result<()> {
        if Arc::ptr_eq(entity.schema(), &self.schema) {
            Ok(())
        } else {
            Err(Error::InvalidOperation(
                "entity was not produced by this table".to_string(),
            ))
        }
    }
}
