//! Profile handle.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use sad_core::{AuthId, EntityId, PermissionMap, ProfilePermissions};

use crate::cache::lock;
use crate::classify::{Operation, Verdict};
use crate::content::Content;
use crate::entity::{Edit, EntityData, EntityRecord};
use crate::error::{ClientError, EntityKind};
use crate::project::{Project, ProjectInner};
use crate::response::Response;
use crate::session::{Session, SessionInner};
use crate::transport::ApiRequest;

/// Changes for [`Profile::edit`].
pub type ProfileEdit = Edit<ProfilePermissions>;

pub(crate) struct ProfileInner {
    pub(crate) session: Weak<SessionInner>,
    pub(crate) project: Mutex<Weak<ProjectInner>>,
    pub(crate) record: Mutex<EntityRecord<ProfilePermissions>>,
}

impl ProfileInner {
    pub(crate) fn new(
        session: Weak<SessionInner>,
        project: Weak<ProjectInner>,
        record: EntityRecord<ProfilePermissions>,
    ) -> Self {
        Self {
            session,
            project: Mutex::new(project),
            record: Mutex::new(record),
        }
    }
}

/// Local mirror of one profile inside a project.
///
/// Holds weak references to its project and session; calls made after
/// either has been dropped fail before any request is sent.
#[derive(Clone)]
pub struct Profile {
    pub(crate) inner: Arc<ProfileInner>,
}

impl Profile {
    pub(crate) const fn from_inner(inner: Arc<ProfileInner>) -> Self {
        Self { inner }
    }

    /// Profile that is not registered in the identity cache.
    pub(crate) fn detached(
        session: Weak<SessionInner>,
        project: &Arc<ProjectInner>,
        record: EntityRecord<ProfilePermissions>,
    ) -> Self {
        Self::from_inner(Arc::new(ProfileInner::new(
            session,
            Arc::downgrade(project),
            record,
        )))
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
    pub fn permissions(&self) -> PermissionMap<ProfilePermissions> {
        lock(&self.inner.record).permissions.clone()
    }

    #[must_use]
    pub fn permission_for(&self, auth_id: AuthId) -> Option<ProfilePermissions> {
        lock(&self.inner.record).permissions.get(&auth_id).copied()
    }

    #[must_use]
    pub fn snapshot(&self) -> EntityRecord<ProfilePermissions> {
        lock(&self.inner.record).clone()
    }

    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The project this profile belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ProjectGone`] if the project has been dropped.
    pub fn project(&self) -> Result<Project, ClientError> {
        self.live_project().map(Project::from_inner)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] if the session has been dropped.
    pub fn session(&self) -> Result<Session, ClientError> {
        self.live_session().map(Session::from_inner)
    }

    fn live_session(&self) -> Result<Arc<SessionInner>, ClientError> {
        self.inner.session.upgrade().ok_or(ClientError::SessionGone)
    }

    fn live_project(&self) -> Result<Arc<ProjectInner>, ClientError> {
        lock(&self.inner.project)
            .upgrade()
            .ok_or(ClientError::ProjectGone)
    }

    /// Session and parent project name, checked before every call.
    fn context(&self) -> Result<(Arc<SessionInner>, String), ClientError> {
        let session = self.live_session()?;
        let project = self.live_project()?;
        let project_name = lock(&project.record).name.clone();
        Ok((session, project_name))
    }

    /// Refresh this profile from the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::OutOfDate`] (and evicts the cached entry) if the
    /// name now belongs to a different profile.
    pub fn update(&self) -> Result<Response, ClientError> {
        let (session, project_name) = self.context()?;
        let name = self.name();
        let request = ApiRequest::new(Operation::UpdateProfile)
            .query("name", project_name)
            .query("profile_name", &name);
        let reply = session.call(request)?;

        match Operation::UpdateProfile.classify(&reply) {
            Verdict::Success => {
                let record = reply
                    .json::<EntityData<ProfilePermissions>>(Operation::UpdateProfile)?
                    .into_record()?;
                let id = self.id();
                if record.id != id {
                    session.evict_profile(id);
                    tracing::warn!(%name, old_id = %id, new_id = %record.id, "profile changed identity");
                    return Err(ClientError::OutOfDate {
                        kind: EntityKind::Profile,
                        name,
                    });
                }
                *lock(&self.inner.record) = record;
                Ok(Response::Success(reply))
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Remove this profile from its project.
    ///
    /// Success and not-found both evict this profile from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] or [`ClientError::ProjectGone`] if the
    /// session or parent project has been dropped,
    /// and [`ClientError::Transport`] if the request fails.
    pub fn remove(&self) -> Result<Response, ClientError> {
        let session = self.live_session()?;
        let project = self.project()?;
        let response = project.remove_profile(&self.name())?;
        if matches!(response, Response::Success(_) | Response::NotFound(_)) {
            session.evict_profile(self.id());
        }
        Ok(response)
    }

    /// Edit this profile's name and/or grants.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] or [`ClientError::ProjectGone`] if the
    /// session or parent project has been dropped,
    /// and [`ClientError::Transport`] if the request fails.
    pub fn edit(&self, edit: &ProfileEdit) -> Result<Response, ClientError> {
        let (session, project_name) = self.context()?;
        let request = ApiRequest::new(Operation::EditProfile)
            .form("name", project_name)
            .form("profile_name", self.name())
            .form("fields", edit.fields_json(Operation::EditProfile)?);
        let reply = session.call(request)?;

        match Operation::EditProfile.classify(&reply) {
            Verdict::Success => {
                lock(&self.inner.record).apply(edit);
                Ok(Response::Success(reply))
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Read the profile's raw contents.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] or [`ClientError::ProjectGone`] if the
    /// session or parent project has been dropped,
    /// and [`ClientError::Transport`] if the request fails.
    pub fn read(&self) -> Result<Response, ClientError> {
        let (session, project_name) = self.context()?;
        let request = ApiRequest::new(Operation::ReadProfile)
            .query("name", project_name)
            .query("profile_name", self.name());
        let reply = session.call(request)?;

        Ok(match Operation::ReadProfile.classify(&reply) {
            Verdict::Success => Response::ProfileContent(reply),
            Verdict::Failure(failure) => Response::failure(failure, reply),
        })
    }

    /// Replace the profile's contents.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] if `content` cannot be read,
    /// in which case nothing is sent. Otherwise as [`Profile::append`].
    pub fn write(&self, content: impl Into<Content>) -> Result<Response, ClientError> {
        self.upload(Operation::WriteProfile, content.into())
    }

    /// Append to the profile's contents.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionGone`] or [`ClientError::ProjectGone`] if the
    /// session or parent project has been dropped.
    /// Transport failures and a non-integer reply surface as
    /// [`ClientError::Transport`] and [`ClientError::MalformedPayload`].
    pub fn append(&self, content: impl Into<Content>) -> Result<Response, ClientError> {
        self.upload(Operation::AppendProfile, content.into())
    }

    fn upload(&self, operation: Operation, content: Content) -> Result<Response, ClientError> {
        let (session, project_name) = self.context()?;
        let bytes = content.into_bytes()?;
        let request = ApiRequest::new(operation)
            .form("name", project_name)
            .form("profile_name", self.name())
            .file("data", bytes);
        let reply = session.call(request)?;

        match operation.classify(&reply) {
            Verdict::Success => {
                let num_bytes = reply.integer(operation)?;
                Ok(Response::RemainingSpace { reply, num_bytes })
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = lock(&self.inner.record);
        f.debug_struct("Profile")
            .field("id", &record.id)
            .field("name", &record.name)
            .field("permissions", &record.permissions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record() -> EntityRecord<ProfilePermissions> {
        EntityRecord {
            id: EntityId::new(4),
            name: "main".into(),
            permissions: BTreeMap::from([(1, ProfilePermissions::READ)]),
        }
    }

    #[test]
    fn dead_session_fails_before_request() {
        let project = Arc::new(ProjectInner::new(
            Weak::new(),
            EntityRecord {
                id: EntityId::new(1),
                name: "p".into(),
                permissions: BTreeMap::new(),
            },
        ));
        let profile = Profile::detached(Weak::new(), &project, record());
        assert!(matches!(profile.read(), Err(ClientError::SessionGone)));
        assert!(matches!(profile.session(), Err(ClientError::SessionGone)));
        assert!(profile.project().is_ok());
    }

    #[test]
    fn dead_project_is_reported() {
        let profile = Profile::from_inner(Arc::new(ProfileInner::new(
            Weak::new(),
            Weak::new(),
            record(),
        )));
        assert!(matches!(profile.project(), Err(ClientError::ProjectGone)));
    }

    #[test]
    fn debug_shows_fields() {
        let profile =
            Profile::from_inner(Arc::new(ProfileInner::new(Weak::new(), Weak::new(), record())));
        let text = format!("{profile:?}");
        assert!(text.contains("main"));
        assert!(text.contains("Profile"));
    }
}
