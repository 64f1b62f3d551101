//! SlugIdArray: ordered identifiers in one contiguous buffer
//!
//! The array stores its elements as concatenated 16-byte records with no
//! padding, delimiters or length prefix. The buffer length is always
//! exactly `16 * len()`, which makes the buffer itself the serialized form.
//!
//! ## Semantics
//!
//! - Duplicates are permitted: this is an ordered multiset, not a set.
//! - `remove` deletes the first matching occurrence and shifts later
//!   elements left.
//! - `Clone` is a deep copy; the clone never shares its buffer.
//!
//! Instances carry no internal synchronization. Callers sharing one across
//! tasks must guard it themselves.

use std::fmt;

use crate::chunk::{self, Chunk};
use crate::error::{Error, Result};
use crate::slugid::{SlugId, SLUGID_BYTES};

/// Ordered, growable sequence of [`SlugId`]s
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SlugIdArray {
    buffer: Vec<u8>,
}

impl SlugIdArray {
    /// Empty array
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Empty array with room for `capacity` identifiers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity * SLUGID_BYTES),
        }
    }

    /// Rebuild from a raw record buffer
    ///
    /// # Errors
    /// `DataCorruption` if the length is not a multiple of 16.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() % SLUGID_BYTES != 0 {
            return Err(Error::DataCorruption(format!(
                "slugid array buffer of {} bytes is not a multiple of {}",
                bytes.len(),
                SLUGID_BYTES
            )));
        }
        Ok(Self { buffer: bytes })
    }

    /// Raw record buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.buffer.len() / SLUGID_BYTES
    }

    /// True if no identifiers are stored
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append an identifier
    pub fn push(&mut self, id: SlugId) {
        self.buffer.extend_from_slice(id.as_bytes());
    }

    /// Parse and append an identifier given in text form
    pub fn push_str(&mut self, text: &str) -> Result<()> {
        self.push(SlugId::parse(text)?);
        Ok(())
    }

    /// Identifier at `index`
    pub fn get(&self, index: usize) -> Option<SlugId> {
        let start = index.checked_mul(SLUGID_BYTES)?;
        let end = start.checked_add(SLUGID_BYTES)?;
        let record = self.buffer.get(start..end)?;
        SlugId::decode(record).ok()
    }

    /// Iterate identifiers in order
    pub fn iter(&self) -> impl Iterator<Item = SlugId> + '_ {
        self.buffer
            .chunks_exact(SLUGID_BYTES)
            .filter_map(|record| SlugId::decode(record).ok())
    }

    /// Identifiers in canonical text form, in order
    pub fn to_array(&self) -> Vec<String> {
        self.iter().map(|id| id.to_string()).collect()
    }

    /// Index of the first occurrence of `id`
    pub fn index_of(&self, id: &SlugId) -> Option<usize> {
        let needle = id.as_bytes();
        self.buffer
            .chunks_exact(SLUGID_BYTES)
            .position(|record| record == needle)
    }

    /// True if `id` occurs at least once
    pub fn contains(&self, id: &SlugId) -> bool {
        self.index_of(id).is_some()
    }

    /// Remove the first occurrence of `id`
    ///
    /// Returns false and leaves the array untouched if `id` is absent.
    pub fn remove(&mut self, id: &SlugId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                let start = index * SLUGID_BYTES;
                self.buffer.drain(start..start + SLUGID_BYTES);
                true
            }
            None => false,
        }
    }

    /// Split the record buffer into chunks of at most `max_chunk_size` bytes
    ///
    /// An empty array yields zero chunks.
    pub fn serialize(&self, max_chunk_size: usize) -> Result<Vec<Chunk>> {
        chunk::split(&self.buffer, max_chunk_size)
    }

    /// Reassemble an array from `declared_count` chunks
    pub fn deserialize(declared_count: usize, chunks: &[Chunk]) -> Result<Self> {
        Self::from_bytes(chunk::join(declared_count, chunks)?)
    }
}

impl fmt::Debug for SlugIdArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<SlugId> for SlugIdArray {
    fn from_iter<I: IntoIterator<Item = SlugId>>(iter: I) -> Self {
        let mut array = SlugIdArray::new();
        for id in iter {
            array.push(id);
        }
        array
    }
}

impl Extend<SlugId> for SlugIdArray {
    fn extend<I: IntoIterator<Item = SlugId>>(&mut self, iter: I) {
        for id in iter {
            self.push(id);
        }
    }
}
