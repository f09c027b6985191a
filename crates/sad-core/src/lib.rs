//! # sad-core
//!
//! Core types shared by every sadstate crate:
//! - Permission flag sets for the two permission domains (project, profile)
//! - Entity identity decoding from server-issued base64 ids
//! - Cross-cutting error types

pub mod errors;
pub mod identity;
pub mod permissions;

pub use errors::{IdError, PermissionError};
pub use identity::{AuthId, EntityId};
pub use permissions::{
    PermissionDomain, PermissionMap, PermissionSet, ProfilePermissions, ProjectPermissions,
};
