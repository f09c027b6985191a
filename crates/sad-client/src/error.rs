//! Client error types.
//!
//! These cover failures raised locally. Anything the server answered with,
//! including refusals, is a [`Response`](crate::Response) variant instead.

use std::fmt;

use sad_config::ConfigError;
use sad_core::IdError;
use thiserror::Error;

use crate::classify::Operation;

/// Kind of mirrored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Profile,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Project => "Project",
            Self::Profile => "Profile",
        })
    }
}

/// Errors raised by the client itself.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP exchange itself failed (connection, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A success reply carried a body that could not be decoded.
    #[error("malformed {operation} payload: {reason}")]
    MalformedPayload { operation: Operation, reason: String },

    /// The server handed out an id that does not decode.
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// A refresh found that the name now belongs to a different entity.
    #[error("{kind} \"{name}\" has changed identity on the server")]
    OutOfDate { kind: EntityKind, name: String },

    /// A caller-supplied argument was unusable (e.g. an unreadable stream).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The session that created this object has been dropped.
    #[error("session has been dropped")]
    SessionGone,

    /// The project this profile belongs to has been dropped.
    #[error("parent project has been dropped")]
    ProjectGone,

    /// The session could not be built from configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Box::new(error))
    }
}
