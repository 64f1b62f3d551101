//! Slugid identifier codec
//!
//! A [`SlugId`] is a 128-bit value with two canonical encodings:
//! - binary: exactly [`SLUGID_BYTES`] bytes
//! - text: [`SLUGID_TEXT_LEN`] characters of unpadded URL-safe base64
//!
//! All conversions are pure. Parsing is strict: the text must be exactly
//! what [`SlugId::encode`] would produce for the decoded bytes, so every
//! identifier has one and only one textual form.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Width of the binary encoding
pub const SLUGID_BYTES: usize = 16;

/// Width of the text encoding
pub const SLUGID_TEXT_LEN: usize = 22;

/// A 128-bit identifier with a URL-safe text form
///
/// Equality is byte-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlugId([u8; SLUGID_BYTES]);

impl SlugId {
    /// Random identifier from a v4 UUID
    pub fn v4() -> Self {
        Self(*Uuid::new_v4().as_bytes())
    }

    /// Random v4 identifier whose text form never starts with `-`
    ///
    /// Clears the most significant bit, leaving 121 random bits.
    pub fn nice() -> Self {
        let mut bytes = *Uuid::new_v4().as_bytes();
        bytes[0] &= 0x7f;
        Self(bytes)
    }

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; SLUGID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Decode the binary form
    ///
    /// # Errors
    /// `InvalidIdentifier` unless `bytes` is exactly 16 bytes long.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; SLUGID_BYTES] = bytes.try_into().map_err(|_| {
            Error::InvalidIdentifier(format!(
                "expected {} bytes, got {}",
                SLUGID_BYTES,
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }

    /// Binary form
    pub fn encode(&self) -> [u8; SLUGID_BYTES] {
        self.0
    }

    /// Borrow the binary form
    pub fn as_bytes(&self) -> &[u8; SLUGID_BYTES] {
        &self.0
    }

    /// Parse the canonical text form
    ///
    /// # Errors
    /// `InvalidIdentifier` if `text` is not 22 URL-safe base64 characters
    /// encoding 16 bytes with zero trailing bits.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() != SLUGID_TEXT_LEN {
            return Err(Error::InvalidIdentifier(format!(
                "'{}' has length {}, expected {}",
                text,
                text.len(),
                SLUGID_TEXT_LEN
            )));
        }
        let decoded = URL_SAFE_NO_PAD
            .decode(text)
            .map_err(|e| Error::InvalidIdentifier(format!("'{}': {}", text, e)))?;
        let id = Self::decode(&decoded)?;
        if id.to_string() != text {
            return Err(Error::InvalidIdentifier(format!(
                "'{}' is not in canonical form",
                text
            )));
        }
        Ok(id)
    }
}

impl fmt::Display for SlugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl FromStr for SlugId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Uuid> for SlugId {
    fn from(uuid: Uuid) -> Self {
        Self(*uuid.as_bytes())
    }
}

impl From<SlugId> for Uuid {
    fn from(id: SlugId) -> Self {
        Uuid::from_bytes(id.0)
    }
}

impl Serialize for SlugId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlugId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
