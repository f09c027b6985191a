//! Response taxonomy.
//!
//! Every call returns exactly one [`Response`]: a success variant carrying the
//! operation's payload, or one of the failure variants produced by the
//! decision tables in [`classify`](crate::classify).

use std::borrow::Cow;
use std::fmt;

use sad_core::{AuthId, PermissionDomain, PermissionSet, ProfilePermissions, ProjectPermissions};

use crate::classify::Failure;
use crate::profile::Profile;
use crate::project::Project;
use crate::transport::Reply;

/// The permission a refused call needed.
///
/// An empty set means the server refused without naming a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredPermission {
    Project(ProjectPermissions),
    Profile(ProfilePermissions),
}

impl RequiredPermission {
    #[must_use]
    pub const fn domain(self) -> PermissionDomain {
        match self {
            Self::Project(_) => PermissionDomain::Project,
            Self::Profile(_) => PermissionDomain::Profile,
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        match self {
            Self::Project(perm) => perm.is_empty(),
            Self::Profile(perm) => perm.is_empty(),
        }
    }

    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        match self {
            Self::Project(perm) => perm.names(),
            Self::Profile(perm) => perm.names(),
        }
    }
}

impl From<ProjectPermissions> for RequiredPermission {
    fn from(perm: ProjectPermissions) -> Self {
        Self::Project(perm)
    }
}

impl From<ProfilePermissions> for RequiredPermission {
    fn from(perm: ProfilePermissions) -> Self {
        Self::Profile(perm)
    }
}

impl fmt::Display for RequiredPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "{}:<unspecified>", self.domain())
        } else {
            write!(f, "{}:{}", self.domain(), names.join("|"))
        }
    }
}

/// Outcome of one completed call.
#[derive(Debug)]
pub enum Response {
    /// Plain success.
    Success(Reply),
    /// A new auth id was issued.
    Auth { reply: Reply, id: AuthId },
    /// A project was fetched (and cached).
    Project { reply: Reply, project: Project },
    /// One or more profiles were fetched.
    Profiles { reply: Reply, profiles: Vec<Profile> },
    /// A profile's raw contents; see [`Response::content`].
    ProfileContent(Reply),
    /// Bytes left in the profile after a write or append.
    RemainingSpace { reply: Reply, num_bytes: u64 },
    NotFound(Reply),
    AlreadyExists(Reply),
    InvalidInput(Reply),
    InvalidAuth(Reply),
    InvalidPermission {
        reply: Reply,
        required: RequiredPermission,
    },
    UnexpectedError(Reply),
}

impl Response {
    pub(crate) fn failure(failure: Failure, reply: Reply) -> Self {
        match failure {
            Failure::InvalidInput => Self::InvalidInput(reply),
            Failure::InvalidAuth => Self::InvalidAuth(reply),
            Failure::NotFound => Self::NotFound(reply),
            Failure::AlreadyExists => Self::AlreadyExists(reply),
            Failure::InvalidPermission(required) => Self::InvalidPermission { reply, required },
            Failure::UnexpectedError => Self::UnexpectedError(reply),
        }
    }

    #[must_use]
    pub const fn reply(&self) -> &Reply {
        match self {
            Self::Success(reply)
            | Self::ProfileContent(reply)
            | Self::NotFound(reply)
            | Self::AlreadyExists(reply)
            | Self::InvalidInput(reply)
            | Self::InvalidAuth(reply)
            | Self::UnexpectedError(reply)
            | Self::Auth { reply, .. }
            | Self::Project { reply, .. }
            | Self::Profiles { reply, .. }
            | Self::RemainingSpace { reply, .. }
            | Self::InvalidPermission { reply, .. } => reply,
        }
    }

    /// HTTP status code of the reply.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.reply().status()
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Success(_)
                | Self::Auth { .. }
                | Self::Project { .. }
                | Self::Profiles { .. }
                | Self::ProfileContent(_)
                | Self::RemainingSpace { .. }
        )
    }

    /// Variant name, for logs and CLI output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "Success",
            Self::Auth { .. } => "Auth",
            Self::Project { .. } => "Project",
            Self::Profiles { .. } => "Profiles",
            Self::ProfileContent(_) => "ProfileContent",
            Self::RemainingSpace { .. } => "RemainingSpace",
            Self::NotFound(_) => "NotFound",
            Self::AlreadyExists(_) => "AlreadyExists",
            Self::InvalidInput(_) => "InvalidInput",
            Self::InvalidAuth(_) => "InvalidAuth",
            Self::InvalidPermission { .. } => "InvalidPermission",
            Self::UnexpectedError(_) => "UnexpectedError",
        }
    }

    /// Body text of a failure, which the service uses as its explanation.
    #[must_use]
    pub fn reason(&self) -> Option<Cow<'_, str>> {
        (!self.is_success()).then(|| self.reply().text())
    }

    /// Raw reply body.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        self.reply().body()
    }

    #[must_use]
    pub const fn auth_id(&self) -> Option<AuthId> {
        match self {
            Self::Auth { id, .. } => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn project(&self) -> Option<&Project> {
        match self {
            Self::Project { project, .. } => Some(project),
            _ => None,
        }
    }

    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        match self {
            Self::Profiles { profiles, .. } => profiles,
            _ => &[],
        }
    }

    /// First profile of a profile list.
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profiles().first()
    }

    #[must_use]
    pub const fn num_bytes(&self) -> Option<u64> {
        match self {
            Self::RemainingSpace { num_bytes, .. } => Some(*num_bytes),
            _ => None,
        }
    }

    #[must_use]
    pub const fn required_permission(&self) -> Option<RequiredPermission> {
        match self {
            Self::InvalidPermission { required, .. } => Some(*required),
            _ => None,
        }
    }

    /// `Some(self)` for success variants, `None` otherwise.
    #[must_use]
    pub fn into_success(self) -> Option<Self> {
        self.is_success().then_some(self)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} [{}]>", self.kind(), self.code())
    }
}
