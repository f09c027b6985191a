//! Cross-cutting error types for sadstate.
//!
//! Errors raised by the client itself (transport, stale cache entries, dead
//! back-references) live in `sad-client`. This module only covers decoding of
//! the primitive values the server hands out.

use thiserror::Error;

use crate::permissions::PermissionDomain;

/// Errors raised while decoding permission values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// The integer contains bits that the domain does not define.
    #[error("invalid {domain} permission value: {value:#b}")]
    InvalidValue {
        domain: PermissionDomain,
        value: u32,
    },
}

/// Errors raised while decoding server-issued entity ids.
#[derive(Debug, Error)]
pub enum IdError {
    /// The id is not valid base64.
    #[error("entity id is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded integer does not fit in 64 bits.
    #[error("entity id is {len} significant bytes wide (max 8)")]
    TooWide { len: usize },
}
