//! Chunk splitter and joiner
//!
//! Splits a serialized buffer into an ordered list of bounded chunks and
//! concatenates them back. Slicing is greedy from the start of the buffer,
//! so a given `(buffer, max_chunk_size)` always yields the same chunks and
//! only the last chunk may be short.
//!
//! An empty buffer splits into zero chunks.

use crate::error::{Error, Result};

/// One bounded fragment of a serialized value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    data: Vec<u8>,
}

impl Chunk {
    /// Create a chunk at a given position
    pub fn new(index: usize, data: Vec<u8>) -> Self {
        Self { index, data }
    }

    /// Position of this chunk in its sequence
    pub fn index(&self) -> usize {
        self.index
    }

    /// Payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length payload
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the payload
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Number of chunks `split` produces for `len` bytes
pub fn chunk_count(len: usize, max_chunk_size: usize) -> usize {
    if max_chunk_size == 0 {
        return 0;
    }
    len.div_ceil(max_chunk_size)
}

/// Split `buffer` into chunks of at most `max_chunk_size` bytes
///
/// # Errors
/// `InvalidOperation` if `max_chunk_size` is zero.
pub fn split(buffer: &[u8], max_chunk_size: usize) -> Result<Vec<Chunk>> {
    if max_chunk_size == 0 {
        return Err(Error::InvalidOperation(
            "max chunk size must be positive".to_string(),
        ));
    }
    Ok(buffer
        .chunks(max_chunk_size)
        .enumerate()
        .map(|(index, data)| Chunk::new(index, data.to_vec()))
        .collect())
}

/// Concatenate chunks in index order
///
/// `declared_count` is the chunk count recorded alongside the chunks.
///
/// # Errors
/// `DataCorruption` if the number of chunks differs from `declared_count`
/// or the chunk indices are not exactly `0..declared_count`.
pub fn join(declared_count: usize, chunks: &[Chunk]) -> Result<Vec<u8>> {
    if chunks.len() != declared_count {
        return Err(Error::DataCorruption(format!(
            "declared {} chunks, found {}",
            declared_count,
            chunks.len()
        )));
    }

    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.index);

    let mut buffer = Vec::with_capacity(chunks.iter().map(Chunk::len).sum());
    for (expected, chunk) in ordered.into_iter().enumerate() {
        if chunk.index != expected {
            return Err(Error::DataCorruption(format!(
                "chunk {} missing or duplicated (found index {})",
                expected, chunk.index
            )));
        }
        buffer.extend_from_slice(&chunk.data);
    }
    Ok(buffer)
}
