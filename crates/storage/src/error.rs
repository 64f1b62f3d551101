//! Errors reported by the table store collaborator

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure of a single store request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The table was never created
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    /// Conditional insert found an existing row
    #[error("row already exists")]
    RowAlreadyExists,

    /// Update or read targeted a missing row
    #[error("row not found")]
    RowNotFound,

    /// Conditional update presented a stale ETag
    #[error("precondition failed: etag is stale")]
    PreconditionFailed,

    /// A column payload exceeds the per-cell limit
    #[error("column '{column}' is {size} bytes, limit is {max}")]
    CellTooLarge {
        /// Offending column
        column: String,
        /// Payload size in bytes
        size: usize,
        /// Allowed maximum
        max: usize,
    },

    /// The row as a whole is too large or has too many columns
    #[error("row too large: {0}")]
    RowTooLarge(String),

    /// HTTP-level failure talking to the store
    #[error("transport failure (status {status}): {message}")]
    Transport {
        /// HTTP status, 0 for connection-level failures and timeouts
        status: u16,
        /// Description
        message: String,
    },
}

impl StoreError {
    /// Build a transport error
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        StoreError::Transport {
            status,
            message: message.into(),
        }
    }

    /// True for timeouts, throttling and server errors
    ///
    /// Status 0 denotes a connection failure or timeout.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport { status, .. } => {
                matches!(*status, 0 | 408 | 429) || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

impl From<StoreError> for entitystore_core::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Transport { .. } => entitystore_core::Error::Transport {
                retryable: e.is_retryable(),
                message: e.to_string(),
            },
            StoreError::TableNotFound(_)
            | StoreError::CellTooLarge { .. }
            | StoreError::RowTooLarge(_) => entitystore_core::Error::InvalidOperation(e.to_string()),
            other => entitystore_core::Error::Transport {
                retryable: false,
                message: other.to_string(),
            },
        }
    }
}
