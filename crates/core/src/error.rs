//! Error types for entitystore
//!
//! This module defines all error types surfaced by the codec, the schema
//! layer and the entity engine.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for entitystore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for entitystore
#[derive(Debug, Error)]
pub enum Error {
    /// Identifier text or bytes are not a canonical slugid
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Schema declaration is inconsistent
    #[error("Schema error: {0}")]
    Schema(String),

    /// A property value does not match its declared type
    #[error("Invalid value for property '{property}': {reason}")]
    InvalidValue {
        /// Property name
        property: String,
        /// What was wrong with the value
        reason: String,
    },

    /// `create` found a row under the same identity
    #[error("Entity already exists: ({partition_key}, {row_key})")]
    EntityAlreadyExists {
        /// Encoded partition key
        partition_key: String,
        /// Encoded row key
        row_key: String,
    },

    /// `load` found no row under the identity
    #[error("Entity not found: ({partition_key}, {row_key})")]
    EntityNotFound {
        /// Encoded partition key
        partition_key: String,
        /// Encoded row key
        row_key: String,
    },

    /// The concurrency token presented on save is stale
    #[error("Concurrency conflict on ({partition_key}, {row_key}): row was modified since it was read")]
    ConcurrencyConflict {
        /// Encoded partition key
        partition_key: String,
        /// Encoded row key
        row_key: String,
    },

    /// Stored chunk bookkeeping or payload is inconsistent
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// Remote store failure
    #[error("Transport error (retryable: {retryable}): {message}")]
    Transport {
        /// Whether the failure class is transient
        retryable: bool,
        /// Description from the store collaborator
        message: String,
    },

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be read or is out of range
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an `InvalidValue` error
    pub fn invalid_value(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// True for transport failures the store collaborator may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { retryable: true, .. })
    }

    /// True when the caller must reload and retry
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::ConcurrencyConflict { .. })
    }

    /// True when the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::EntityNotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
