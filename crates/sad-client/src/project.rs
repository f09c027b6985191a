//! Project handle.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use sad_core::{AuthId, EntityId, PermissionMap, ProfilePermissions, ProjectPermissions};
use serde_json::{Map, Value};

use crate::cache::lock;
use crate::classify::{Failure, Operation, Verdict};
use crate::entity::{Edit, EntityData, EntityRecord, creation_fields};
use crate::error::{ClientError, EntityKind};
use crate::profile::Profile;
use crate::response::Response;
use crate::session::{Session, SessionInner};
use crate::transport::ApiRequest;

/// Changes for [`Project::edit`].
pub type ProjectEdit = Edit<ProjectPermissions>;

pub(crate) struct ProjectInner {
    pub(crate) session: Weak<SessionInner>,
    pub(crate) record: Mutex<EntityRecord<ProjectPermissions>>,
}

impl ProjectInner {
    pub(crate) fn new(
        session: Weak<SessionInner>,
        record: EntityRecord<ProjectPermissions>,
    ) -> Self {
        Self {
            session,
            record: Mutex::new(record),
        }
    }
}

/// Local mirror of one server-side project.
///
/// Handles are cheap to clone; every clone, and every later lookup of the
/// same project through the session, refers to the same object.
#[derive(Clone)]
pub struct Project {
    pub(crate) inner: Arc<ProjectInner>,
}

impl Project {
    pub(crate) const fn from_inner(inner: Arc<ProjectInner>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        lock(&self.inner.record).id
    }

    #[must_use]
    pub fn name(&self) -> String {
        lock(&self.inner.record).name.clone()
    }

    #[must_use]
    pub fn permissions(&self) -> PermissionMap<ProjectPermissions> {
        lock(&self.inner.record).permissions.clone()
    }

    #[must_use]
    pub fn permission_for(&self, auth_id: AuthId) -> Option<ProjectPermissions> {
        lock(&self.inner.record).permissions.get(&auth_id).copied()
    }

    /// Copy of the current field values.
    #[must_use]
    pub fn snapshot(&self) -> EntityRecord<ProjectPermissions> {
        lock(&self.inner.record).clone()
    }

    /// Whether both handles refer to the same object.
    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The session that fetched this project.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped.
    pub fn session(&self) -> Result<Session, ClientError> {
        self.live_session().map(Session::from_inner)
    }

    pub(crate) fn live_session(&self) -> Result<Arc<SessionInner>, ClientError> {
        self.inner.session.upgrade().ok_or(ClientError::SessionGone)
    }

    /// Refresh this project from the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::OutOfDate`] (and evicts the cached entry) if the
    /// name now belongs to a different project.
    pub fn update(&self) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let name = self.name();
        let reply = session.call(ApiRequest::new(Operation::UpdateProject).query("name", &name))?;

        match Operation::UpdateProject.classify(&reply) {
            Verdict::Success => {
                let record = reply
                    .json::<EntityData<ProjectPermissions>>(Operation::UpdateProject)?
                    .into_record()?;
                let id = self.id();
                if record.id != id {
                    session.evict_project(id);
                    tracing::warn!(%name, old_id = %id, new_id = %record.id, "project changed identity");
                    return Err(ClientError::OutOfDate {
                        kind: EntityKind::Project,
                        name,
                    });
                }
                *lock(&self.inner.record) = record;
                Ok(Response::Success(reply))
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Edit this project's name and/or grants.
    ///
    /// On success only the fields present in `edit` change locally.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped,
    /// or [`ClientError::Transport`] if the request fails.
    pub fn edit(&self, edit: &ProjectEdit) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let request = ApiRequest::new(Operation::EditProject)
            .form("name", self.name())
            .form("fields", edit.fields_json(Operation::EditProject)?);
        let reply = session.call(request)?;

        match Operation::EditProject.classify(&reply) {
            Verdict::Success => {
                lock(&self.inner.record).apply(edit);
                Ok(Response::Success(reply))
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Delete this project and all of its profiles.
    ///
    /// Success and not-found both evict the project from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped,
    /// or [`ClientError::Transport`] if the request fails.
    pub fn delete(&self) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let reply =
            session.call(ApiRequest::new(Operation::DeleteProject).query("name", self.name()))?;

        let verdict = Operation::DeleteProject.classify(&reply);
        if matches!(verdict, Verdict::Success | Verdict::Failure(Failure::NotFound)) {
            session.evict_project(self.id());
        }
        Ok(match verdict {
            Verdict::Success => Response::Success(reply),
            Verdict::Failure(failure) => Response::failure(failure, reply),
        })
    }

    /// Fetch one profile of this project by name.
    ///
    /// A profile already in the cache is refreshed in place and returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped.
    /// Transport failures and undecodable profile bodies surface as
    /// [`ClientError::Transport`] and [`ClientError::MalformedPayload`].
    pub fn get_profile(&self, name: &str) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let request = ApiRequest::new(Operation::GetProfile)
            .query("name", self.name())
            .query("profile_name", name);
        let reply = session.call(request)?;

        match Operation::GetProfile.classify(&reply) {
            Verdict::Success => {
                let record = reply
                    .json::<EntityData<ProfilePermissions>>(Operation::GetProfile)?
                    .into_record()?;
                let profile = session.cache_profile(&self.inner, record);
                Ok(Response::Profiles {
                    reply,
                    profiles: vec![profile],
                })
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Fetch every profile of this project.
    ///
    /// The returned profiles are fresh snapshots and are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped.
    /// Transport failures and undecodable bodies surface as
    /// [`ClientError::Transport`] and [`ClientError::MalformedPayload`].
    pub fn get_all_profiles(&self) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let reply =
            session.call(ApiRequest::new(Operation::AllProfiles).query("name", self.name()))?;

        match Operation::AllProfiles.classify(&reply) {
            Verdict::Success => {
                let profiles = reply
                    .json::<Vec<EntityData<ProfilePermissions>>>(Operation::AllProfiles)?
                    .into_iter()
                    .map(|data| {
                        data.into_record().map(|record| {
                            Profile::detached(Arc::downgrade(&session), &self.inner, record)
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Response::Profiles { reply, profiles })
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Add a profile to this project.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped,
    /// or [`ClientError::Transport`] if the request fails.
    pub fn add_profile(
        &self,
        name: &str,
        permissions: Option<&PermissionMap<ProfilePermissions>>,
    ) -> Result<Response, ClientError> {
        self.add_profile_with_fields(name, permissions, &Map::new())
    }

    /// Add a profile, forwarding extra `fields` to the service.
    ///
    /// # Errors
    ///
    /// Same as [`Project::add_profile`].
    pub fn add_profile_with_fields(
        &self,
        name: &str,
        permissions: Option<&PermissionMap<ProfilePermissions>>,
        fields: &Map<String, Value>,
    ) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let request = ApiRequest::new(Operation::AddProfile)
            .form("name", self.name())
            .form("profile_name", name)
            .form(
                "fields",
                creation_fields(permissions, fields, Operation::AddProfile)?,
            );
        let reply = session.call(request)?;

        Ok(match Operation::AddProfile.classify(&reply) {
            Verdict::Success => Response::Success(reply),
            Verdict::Failure(failure) => Response::failure(failure, reply),
        })
    }

    /// Remove the profile called `name` from this project.
    ///
    /// Success and not-found both evict any cached profile of this project
    /// with that name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped,
    /// or [`ClientError::Transport`] if the request fails.
    pub fn remove_profile(&self, name: &str) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let request = ApiRequest::new(Operation::RemoveProfile)
            .query("name", self.name())
            .query("profile_name", name);
        let reply = session.call(request)?;

        let verdict = Operation::RemoveProfile.classify(&reply);
        if matches!(verdict, Verdict::Success | Verdict::Failure(Failure::NotFound)) {
            session.evict_profiles_named(&self.inner, name);
        }
        Ok(match verdict {
            Verdict::Success => Response::Success(reply),
            Verdict::Failure(failure) => Response::failure(failure, reply),
        })
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = lock(&self.inner.record);
        f.debug_struct("Project")
            .field("id", &record.id)
            .field("name", &record.name)
            .field("permissions", &record.permissions)
            .finish()
    }
}
