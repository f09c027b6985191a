//! Reply classification.
//!
//! Every operation owns an ordered decision table. A row matches on the
//! status code and a predicate over the body text; the first matching row
//! decides the outcome and an unmatched reply is an unexpected error. The
//! tables differ between call sites in small ways (which statuses are
//! recognised, which body markers are required), so they are spelled out per
//! operation rather than shared.

use std::fmt;

use sad_core::{PermissionDomain, PermissionSet, ProfilePermissions, ProjectPermissions};

use crate::response::RequiredPermission;
use crate::transport::{Method, Reply};

/// Predicate over the reply body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMatch {
    Any,
    Contains(&'static str),
    StartsWith(&'static str),
}

impl BodyMatch {
    #[must_use]
    pub fn matches(self, body: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Contains(needle) => body.contains(needle),
            Self::StartsWith(prefix) => body.starts_with(prefix),
        }
    }
}

/// What a table row resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    InvalidInput,
    InvalidAuth,
    NotFound,
    AlreadyExists,
    /// A fixed permission, known from the operation.
    InvalidPermission(RequiredPermission),
    /// The permission is named in the body; scan it in the given domain.
    PermissionFromBody(PermissionDomain),
}

/// One row of a decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub status: u16,
    pub body: BodyMatch,
    pub outcome: Outcome,
}

const fn rule(status: u16, body: BodyMatch, outcome: Outcome) -> Rule {
    Rule {
        status,
        body,
        outcome,
    }
}

/// Result of classifying one reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(Failure),
}

/// The non-success outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    InvalidInput,
    InvalidAuth,
    NotFound,
    AlreadyExists,
    InvalidPermission(RequiredPermission),
    UnexpectedError,
}

/// Every call the client can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    NewAuth,
    Authenticate,
    GetProject,
    RegisterProject,
    UpdateProject,
    EditProject,
    DeleteProject,
    GetProfile,
    AllProfiles,
    AddProfile,
    RemoveProfile,
    UpdateProfile,
    EditProfile,
    ReadProfile,
    WriteProfile,
    AppendProfile,
}

const ALREADY_A_PROJECT: &str = "Already a Project";
const ALREADY_A_PROFILE: &str = "Already a Profile";
const CANNOT_GIVE_PERMISSIONS: &str = "Cannot give permissions";
const PROFILE_MARKER: &str = "Profile";

const fn project(perm: ProjectPermissions) -> Outcome {
    Outcome::InvalidPermission(RequiredPermission::Project(perm))
}

const fn profile(perm: ProfilePermissions) -> Outcome {
    Outcome::InvalidPermission(RequiredPermission::Profile(perm))
}

static NEW_AUTH: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(400, BodyMatch::Any, Outcome::InvalidInput),
];

static AUTHENTICATE: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(401, BodyMatch::Any, Outcome::InvalidAuth),
];

static GET_PROJECT: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(403, BodyMatch::Any, project(ProjectPermissions::VIEW)),
    rule(404, BodyMatch::Any, Outcome::NotFound),
];

static REGISTER_PROJECT: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(400, BodyMatch::Any, Outcome::InvalidInput),
    rule(401, BodyMatch::Any, Outcome::InvalidAuth),
    rule(403, BodyMatch::StartsWith(ALREADY_A_PROJECT), Outcome::AlreadyExists),
    rule(403, BodyMatch::Any, Outcome::InvalidInput),
];

static EDIT_PROJECT: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(400, BodyMatch::Any, Outcome::InvalidInput),
    rule(403, BodyMatch::StartsWith(ALREADY_A_PROJECT), Outcome::AlreadyExists),
    rule(
        403,
        BodyMatch::StartsWith(CANNOT_GIVE_PERMISSIONS),
        Outcome::PermissionFromBody(PermissionDomain::Project),
    ),
    rule(403, BodyMatch::Any, project(ProjectPermissions::empty())),
];

static DELETE_PROJECT: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(403, BodyMatch::Any, project(ProjectPermissions::DELETE)),
    rule(404, BodyMatch::Any, Outcome::NotFound),
];

static GET_PROFILE: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(403, BodyMatch::Any, project(ProjectPermissions::VIEW)),
    rule(404, BodyMatch::Contains(PROFILE_MARKER), Outcome::NotFound),
];

static ALL_PROFILES: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(403, BodyMatch::Any, project(ProjectPermissions::VIEW)),
];

static ADD_PROFILE: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(400, BodyMatch::Any, Outcome::InvalidInput),
    rule(401, BodyMatch::Any, Outcome::InvalidAuth),
    rule(403, BodyMatch::StartsWith(ALREADY_A_PROFILE), Outcome::AlreadyExists),
    rule(403, BodyMatch::Any, Outcome::InvalidInput),
];

static REMOVE_PROFILE: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(403, BodyMatch::Any, project(ProjectPermissions::DELETE)),
    rule(404, BodyMatch::Contains(PROFILE_MARKER), Outcome::NotFound),
];

static EDIT_PROFILE: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(400, BodyMatch::Any, Outcome::InvalidInput),
    rule(403, BodyMatch::StartsWith(ALREADY_A_PROFILE), Outcome::AlreadyExists),
    rule(
        403,
        BodyMatch::StartsWith(CANNOT_GIVE_PERMISSIONS),
        Outcome::PermissionFromBody(PermissionDomain::Project),
    ),
    rule(403, BodyMatch::Any, project(ProjectPermissions::empty())),
];

static READ_PROFILE: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(403, BodyMatch::Any, profile(ProfilePermissions::READ)),
    rule(404, BodyMatch::Contains(PROFILE_MARKER), Outcome::NotFound),
];

// The write endpoints report a missing profile as a 400.
static WRITE_PROFILE: &[Rule] = &[
    rule(200, BodyMatch::Any, Outcome::Success),
    rule(403, BodyMatch::Any, profile(ProfilePermissions::WRITE)),
    rule(400, BodyMatch::Contains(PROFILE_MARKER), Outcome::NotFound),
];

impl Operation {
    /// Every operation, in endpoint order.
    pub const ALL: [Self; 16] = [
        Self::NewAuth,
        Self::Authenticate,
        Self::GetProject,
        Self::RegisterProject,
        Self::UpdateProject,
        Self::EditProject,
        Self::DeleteProject,
        Self::GetProfile,
        Self::AllProfiles,
        Self::AddProfile,
        Self::RemoveProfile,
        Self::UpdateProfile,
        Self::EditProfile,
        Self::ReadProfile,
        Self::WriteProfile,
        Self::AppendProfile,
    ];

    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::GetProject
            | Self::UpdateProject
            | Self::GetProfile
            | Self::UpdateProfile
            | Self::AllProfiles
            | Self::ReadProfile => Method::Get,
            Self::DeleteProject => Method::Delete,
            Self::NewAuth
            | Self::Authenticate
            | Self::RegisterProject
            | Self::EditProject
            | Self::EditProfile
            | Self::AddProfile
            | Self::RemoveProfile
            | Self::WriteProfile
            | Self::AppendProfile => Method::Post,
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::NewAuth => "/auth/new",
            Self::Authenticate => "/auth/set",
            Self::GetProject | Self::UpdateProject => "/project/get",
            Self::RegisterProject => "/project/register",
            Self::EditProject | Self::EditProfile => "/project/edit",
            Self::DeleteProject => "/project/delete",
            Self::GetProfile | Self::UpdateProfile => "/project/profile/get",
            Self::AllProfiles => "/project/profile/all",
            Self::AddProfile => "/project/profile/add",
            Self::RemoveProfile => "/project/profile/remove",
            Self::ReadProfile => "/project/profile/read",
            Self::WriteProfile => "/project/profile/write",
            Self::AppendProfile => "/project/profile/append",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewAuth => "new_auth",
            Self::Authenticate => "authenticate",
            Self::GetProject => "get_project",
            Self::RegisterProject => "register_project",
            Self::UpdateProject => "update_project",
            Self::EditProject => "edit_project",
            Self::DeleteProject => "delete_project",
            Self::GetProfile => "get_profile",
            Self::AllProfiles => "all_profiles",
            Self::AddProfile => "add_profile",
            Self::RemoveProfile => "remove_profile",
            Self::UpdateProfile => "update_profile",
            Self::EditProfile => "edit_profile",
            Self::ReadProfile => "read_profile",
            Self::WriteProfile => "write_profile",
            Self::AppendProfile => "append_profile",
        }
    }

    /// The decision table, in match order.
    #[must_use]
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Self::NewAuth => NEW_AUTH,
            Self::Authenticate => AUTHENTICATE,
            Self::GetProject | Self::UpdateProject => GET_PROJECT,
            Self::RegisterProject => REGISTER_PROJECT,
            Self::EditProject => EDIT_PROJECT,
            Self::DeleteProject => DELETE_PROJECT,
            Self::GetProfile | Self::UpdateProfile => GET_PROFILE,
            Self::AllProfiles => ALL_PROFILES,
            Self::AddProfile => ADD_PROFILE,
            Self::RemoveProfile => REMOVE_PROFILE,
            Self::EditProfile => EDIT_PROFILE,
            Self::ReadProfile => READ_PROFILE,
            Self::WriteProfile | Self::AppendProfile => WRITE_PROFILE,
        }
    }

    /// Classify a reply against this operation's table.
    #[must_use]
    pub fn classify(self, reply: &Reply) -> Verdict {
        let body = reply.text();
        let Some(rule) = self
            .rules()
            .iter()
            .find(|rule| rule.status == reply.status() && rule.body.matches(&body))
        else {
            return Verdict::Failure(Failure::UnexpectedError);
        };

        match rule.outcome {
            Outcome::Success => Verdict::Success,
            Outcome::InvalidInput => Verdict::Failure(Failure::InvalidInput),
            Outcome::InvalidAuth => Verdict::Failure(Failure::InvalidAuth),
            Outcome::NotFound => Verdict::Failure(Failure::NotFound),
            Outcome::AlreadyExists => Verdict::Failure(Failure::AlreadyExists),
            Outcome::InvalidPermission(required) => {
                Verdict::Failure(Failure::InvalidPermission(required))
            }
            Outcome::PermissionFromBody(domain) => {
                Verdict::Failure(Failure::InvalidPermission(permission_from_body(domain, &body)))
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find the first bit of `domain`, in declaration order, named in `body`.
///
/// Names are matched against whole tokens, so `EDIT_PROFILE` is never
/// mistaken for `EDIT`. With no match the empty set of the domain is returned.
#[must_use]
pub fn permission_from_body(domain: PermissionDomain, body: &str) -> RequiredPermission {
    match domain {
        PermissionDomain::Project => RequiredPermission::Project(first_named(body)),
        PermissionDomain::Profile => RequiredPermission::Profile(first_named(body)),
    }
}

fn first_named<P: PermissionSet>(body: &str) -> P {
    let tokens: Vec<&str> = body
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .collect();
    P::full()
        .names()
        .into_iter()
        .find(|name| tokens.contains(name))
        .and_then(P::lookup)
        .unwrap_or_else(P::none)
}
