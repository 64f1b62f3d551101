//! Size limits of the backing table store
//!
//! The remote store caps every column at [`MAX_CELL_BYTES`]. Values whose
//! encoding may exceed that are split into chunks no larger than the
//! configured chunk size, which itself may never exceed the cell limit.

use crate::error::{Error, Result};

/// Maximum size of a single column payload in bytes (64 KiB)
pub const MAX_CELL_BYTES: usize = 64 * 1024;

/// Default chunk size used by buffer-backed property types
pub const DEFAULT_CHUNK_SIZE: usize = MAX_CELL_BYTES;

/// Validate a configured chunk size
///
/// Returns the size unchanged if it lies in `1..=MAX_CELL_BYTES`.
pub fn validate_chunk_size(size: usize) -> Result<usize> {
    if size == 0 || size > MAX_CELL_BYTES {
        return Err(Error::Config(format!(
            "chunk size {} out of range 1..={}",
            size, MAX_CELL_BYTES
        )));
    }
    Ok(size)
}
