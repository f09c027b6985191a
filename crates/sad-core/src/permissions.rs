//! Permission flag sets.
//!
//! Two independent domains exist: [`ProjectPermissions`] gate actions on a
//! project as a whole, [`ProfilePermissions`] gate access to one profile's
//! contents. They share a mechanism (the [`PermissionSet`] trait) but are
//! distinct types, so a project permission can never be checked against a
//! profile grant.
//!
//! # Example
//!
//! ```
//! use sad_core::{PermissionSet, ProfilePermissions, ProjectPermissions};
//!
//! let grant = ProjectPermissions::VIEW | ProjectPermissions::EDIT;
//! assert!(grant.contains(ProjectPermissions::VIEW));
//! assert!(!grant.contains(ProjectPermissions::DELETE));
//!
//! assert_eq!(ProfilePermissions::default(), ProfilePermissions::READ);
//! assert_eq!(
//!     ProfilePermissions::from_value(ProfilePermissions::ALL.value()).unwrap(),
//!     ProfilePermissions::ALL,
//! );
//! assert!(ProfilePermissions::from_value(0b1000).is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::PermissionError;
use crate::identity::AuthId;

/// Mapping from auth id to the permissions granted to it.
pub type PermissionMap<P> = BTreeMap<AuthId, P>;

/// Which permission domain a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionDomain {
    Project,
    Profile,
}

impl PermissionDomain {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for PermissionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared behaviour of the permission domains.
///
/// Values travel over the wire as plain integers; decoding rejects bits the
/// domain does not define.
pub trait PermissionSet:
    Copy + Eq + fmt::Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The domain this set belongs to.
    const DOMAIN: PermissionDomain;

    /// Every bit the domain defines.
    fn full() -> Self;

    /// No bits set. Used as the "unknown permission" sentinel.
    fn none() -> Self;

    /// Integer encoding.
    fn value(self) -> u32;

    /// Decode an integer, failing on unknown bits.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidValue`] if `value` has a bit outside
    /// the domain.
    fn from_value(value: u32) -> Result<Self, PermissionError>;

    /// Look up a single bit by its exact name (e.g. `EDIT_PROFILE`).
    fn lookup(name: &str) -> Option<Self>;

    /// Names of the bits set, in declaration order.
    fn names(self) -> Vec<&'static str>;
}

bitflags! {
    /// Actions on a project.
    ///
    /// | Bit | Allows |
    /// |-----|--------|
    /// | [`EDIT`](Self::EDIT) | renaming the project, changing grants |
    /// | [`DELETE`](Self::DELETE) | deleting the project and removing profiles |
    /// | [`VIEW`](Self::VIEW) | fetching the project and listing profiles |
    /// | [`ADD_PROFILE`](Self::ADD_PROFILE) | adding profiles |
    /// | [`EDIT_PROFILE`](Self::EDIT_PROFILE) | editing profiles |
    /// | [`REMOVE_PROFILE`](Self::REMOVE_PROFILE) | removing profiles |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProjectPermissions: u32 {
        const EDIT           = 0b00_0001;
        const DELETE         = 0b00_0010;
        const VIEW           = 0b00_0100;
        const ADD_PROFILE    = 0b00_1000;
        const EDIT_PROFILE   = 0b01_0000;
        const REMOVE_PROFILE = 0b10_0000;
    }
}

impl ProjectPermissions {
    /// All project permissions.
    pub const ALL: Self = Self::EDIT
        .union(Self::DELETE)
        .union(Self::VIEW)
        .union(Self::ADD_PROFILE)
        .union(Self::EDIT_PROFILE)
        .union(Self::REMOVE_PROFILE);
}

bitflags! {
    /// Access to one profile's contents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProfilePermissions: u32 {
        const READ  = 0b001;
        const WRITE = 0b010;
        const EDIT  = 0b100;
    }
}

impl ProfilePermissions {
    /// All profile permissions.
    pub const ALL: Self = Self::READ.union(Self::WRITE).union(Self::EDIT);
}

macro_rules! permission_set {
    ($ty:ident, $domain:expr, default = $default:ident) => {
        impl Default for $ty {
            fn default() -> Self {
                Self::$default
            }
        }

        impl PermissionSet for $ty {
            const DOMAIN: PermissionDomain = $domain;

            fn full() -> Self {
                Self::ALL
            }

            fn none() -> Self {
                Self::empty()
            }

            fn value(self) -> u32 {
                self.bits()
            }

            fn from_value(value: u32) -> Result<Self, PermissionError> {
                Self::from_bits(value).ok_or(PermissionError::InvalidValue {
                    domain: Self::DOMAIN,
                    value,
                })
            }

            fn lookup(name: &str) -> Option<Self> {
                Self::from_name(name)
            }

            fn names(self) -> Vec<&'static str> {
                self.iter_names().map(|(name, _)| name).collect()
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u32(self.bits())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = u32::deserialize(deserializer)?;
                <Self as PermissionSet>::from_value(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

permission_set!(ProjectPermissions, PermissionDomain::Project, default = VIEW);
permission_set!(ProfilePermissions, PermissionDomain::Profile, default = READ);
