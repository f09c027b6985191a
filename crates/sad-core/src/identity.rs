//! Entity identity.
//!
//! The server names every project and profile with an opaque base64 id. The
//! bytes are a little-endian unsigned integer; the decoded integer is the key
//! of the client-side identity cache.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::errors::IdError;

/// Identifier of an auth identity, as issued by `/auth/new`.
pub type AuthId = u64;

/// Decoded identity of a project or profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Decode a server-issued id.
    ///
    /// Trailing zero bytes are insignificant, so ids padded beyond eight bytes
    /// still decode as long as the extra bytes are zero.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Base64`] for malformed base64 and
    /// [`IdError::TooWide`] when the integer needs more than 64 bits.
    pub fn decode(encoded: &str) -> Result<Self, IdError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        let significant = bytes
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |last| last + 1);
        if significant > 8 {
            return Err(IdError::TooWide { len: significant });
        }

        let mut buf = [0u8; 8];
        buf[..significant].copy_from_slice(&bytes[..significant]);
        Ok(Self(u64::from_le_bytes(buf)))
    }

    /// Encode in the server's format (minimal little-endian bytes).
    #[must_use]
    pub fn encode(self) -> String {
        let bytes = self.0.to_le_bytes();
        let len = bytes.iter().rposition(|b| *b != 0).map_or(0, |last| last + 1);
        STANDARD.encode(&bytes[..len])
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
