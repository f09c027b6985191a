//! Session: transport, host, authentication state and the identity cache.

use std::fmt;
use std::sync::{Arc, Mutex};

use sad_config::{SadConfig, ServerConfig};
use sad_core::{AuthId, EntityId, PermissionMap, ProfilePermissions, ProjectPermissions};
use serde_json::{Map, Value};

use crate::cache::{IdentityCache, lock};
use crate::classify::{Operation, Verdict};
use crate::entity::{EntityData, EntityRecord, creation_fields};
use crate::error::ClientError;
use crate::profile::Profile;
use crate::project::{Project, ProjectInner};
use crate::response::Response;
use crate::transport::{ApiRequest, HttpTransport, Reply, Transport};

#[derive(Default)]
struct SessionState {
    auth_id: Option<AuthId>,
    cache: IdentityCache,
}

pub(crate) struct SessionInner {
    host: String,
    transport: Box<dyn Transport>,
    state: Mutex<SessionState>,
}

impl SessionInner {
    /// Perform one exchange through the transport.
    pub(crate) fn call(&self, request: ApiRequest) -> Result<Reply, ClientError> {
        let operation = request.operation;
        let method = request.method;
        let path = request.path;
        let reply = self.transport.perform(&self.host, request).inspect_err(|e| {
            tracing::debug!(%operation, %method, path, error = %e, "request failed");
        })?;
        tracing::debug!(%operation, %method, path, status = reply.status(), "request completed");
        Ok(reply)
    }

    /// Record the authenticated id, clearing the cache when it changes.
    fn replace_auth_id(&self, id: AuthId) {
        let mut state = lock(&self.state);
        if state.auth_id != Some(id) {
            let dropped = state.cache.len();
            state.cache.clear();
            tracing::info!(auth_id = id, dropped, "auth id changed, cache cleared");
        }
        state.auth_id = Some(id);
    }

    fn cache_project(self: &Arc<Self>, record: EntityRecord<ProjectPermissions>) -> Project {
        let inner = lock(&self.state)
            .cache
            .upsert_project(&Arc::downgrade(self), record);
        Project::from_inner(inner)
    }

    pub(crate) fn cache_profile(
        self: &Arc<Self>,
        project: &Arc<ProjectInner>,
        record: EntityRecord<ProfilePermissions>,
    ) -> Profile {
        let inner = lock(&self.state)
            .cache
            .upsert_profile(&Arc::downgrade(self), project, record);
        Profile::from_inner(inner)
    }

    pub(crate) fn evict_project(&self, id: EntityId) {
        if lock(&self.state).cache.evict_project(id) {
            tracing::info!(%id, "evicted project");
        }
    }

    pub(crate) fn evict_profile(&self, id: EntityId) {
        if lock(&self.state).cache.evict_profile(id) {
            tracing::info!(%id, "evicted profile");
        }
    }

    pub(crate) fn evict_profiles_named(&self, project: &Arc<ProjectInner>, name: &str) {
        let evicted = lock(&self.state).cache.evict_profiles_named(project, name);
        if evicted > 0 {
            tracing::info!(profile = name, evicted, "evicted profiles");
        }
    }
}

/// Entry point for talking to one sadstate service.
///
/// Cloning a session yields another handle to the same state. Projects and
/// profiles hold only weak references back to it, so once every `Session`
/// handle is dropped their calls fail with [`ClientError::SessionGone`].
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Session over HTTP with default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `host` is not an http(s) URL, or
    /// [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(host: impl Into<String>) -> Result<Self, ClientError> {
        Self::from_server_config(&ServerConfig {
            host: host.into(),
            ..ServerConfig::default()
        })
    }

    /// Session built from loaded configuration.
    ///
    /// Credentials in `config.auth` are not used here; see
    /// [`Session::authenticate`].
    ///
    /// # Errors
    ///
    /// Same as [`Session::new`].
    pub fn from_config(config: &SadConfig) -> Result<Self, ClientError> {
        Self::from_server_config(&config.server)
    }

    fn from_server_config(server: &ServerConfig) -> Result<Self, ClientError> {
        let host = server.base_url()?.to_owned();
        let transport = HttpTransport::new(server)?;
        Ok(Self::with_transport(host, transport))
    }

    /// Session over a caller-supplied transport.
    pub fn with_transport(host: impl Into<String>, transport: impl Transport + 'static) -> Self {
        let mut host = host.into();
        while host.ends_with('/') {
            host.pop();
        }
        Self {
            inner: Arc::new(SessionInner {
                host,
                transport: Box::new(transport),
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub(crate) const fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Id of the last successful `new_auth` or `authenticate` call.
    #[must_use]
    pub fn auth_id(&self) -> Option<AuthId> {
        lock(&self.inner.state).auth_id
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_id().is_some()
    }

    /// Whether both handles refer to the same session.
    #[must_use]
    pub fn same_session(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Drop every cached project and profile.
    ///
    /// Handles already given out stay usable; later lookups build new objects.
    pub fn clear_cache(&self) {
        let mut state = lock(&self.inner.state);
        let dropped = state.cache.len();
        state.cache.clear();
        tracing::info!(dropped, "cache cleared");
    }

    #[must_use]
    pub fn cached_projects(&self) -> Vec<Project> {
        lock(&self.inner.state)
            .cache
            .projects()
            .cloned()
            .map(Project::from_inner)
            .collect()
    }

    #[must_use]
    pub fn cached_profiles(&self) -> Vec<Profile> {
        lock(&self.inner.state)
            .cache
            .profiles()
            .cloned()
            .map(Profile::from_inner)
            .collect()
    }

    /// Create a new auth id protected by `password` and switch to it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the request fails, and
    /// [`ClientError::MalformedPayload`] if a success body is not an integer id.
    pub fn new_auth(&self, password: &str) -> Result<Response, ClientError> {
        let reply = self
            .inner
            .call(ApiRequest::new(Operation::NewAuth).form("password", password))?;

        match Operation::NewAuth.classify(&reply) {
            Verdict::Success => {
                let id = reply.integer(Operation::NewAuth)?;
                self.inner.replace_auth_id(id);
                Ok(Response::Auth { reply, id })
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Authenticate as an existing auth id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the request fails.
    pub fn authenticate(&self, id: AuthId, password: &str) -> Result<Response, ClientError> {
        let request = ApiRequest::new(Operation::Authenticate)
            .form("id", id.to_string())
            .form("password", password);
        let reply = self.inner.call(request)?;

        Ok(match Operation::Authenticate.classify(&reply) {
            Verdict::Success => {
                self.inner.replace_auth_id(id);
                Response::Success(reply)
            }
            Verdict::Failure(failure) => Response::failure(failure, reply),
        })
    }

    /// Fetch a project by name.
    ///
    /// A project already in the cache is refreshed in place and returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the request fails, and
    /// [`ClientError::MalformedPayload`] if the project body cannot be decoded.
    pub fn get_project(&self, name: &str) -> Result<Response, ClientError> {
        let reply = self
            .inner
            .call(ApiRequest::new(Operation::GetProject).query("name", name))?;

        match Operation::GetProject.classify(&reply) {
            Verdict::Success => {
                let record = reply
                    .json::<EntityData<ProjectPermissions>>(Operation::GetProject)?
                    .into_record()?;
                let project = self.inner.cache_project(record);
                Ok(Response::Project { reply, project })
            }
            Verdict::Failure(failure) => Ok(Response::failure(failure, reply)),
        }
    }

    /// Register a new project.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the request fails, and
    /// [`ClientError::MalformedPayload`] if `permissions` cannot be encoded.
    pub fn register_project(
        &self,
        name: &str,
        permissions: Option<&PermissionMap<ProjectPermissions>>,
    ) -> Result<Response, ClientError> {
        self.register_project_with_fields(name, permissions, &Map::new())
    }

    /// Register a new project, forwarding extra `fields` to the service.
    ///
    /// # Errors
    ///
    /// Same as [`Session::register_project`].
    pub fn register_project_with_fields(
        &self,
        name: &str,
        permissions: Option<&PermissionMap<ProjectPermissions>>,
        fields: &Map<String, Value>,
    ) -> Result<Response, ClientError> {
        let request = ApiRequest::new(Operation::RegisterProject)
            .form("name", name)
            .form(
                "fields",
                creation_fields(permissions, fields, Operation::RegisterProject)?,
            );
        let reply = self.inner.call(request)?;

        Ok(match Operation::RegisterProject.classify(&reply) {
            Verdict::Success => Response::Success(reply),
            Verdict::Failure(failure) => Response::failure(failure, reply),
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Session")
            .field("host", &self.inner.host)
            .field("auth_id", &state.auth_id)
            .field("cached", &state.cache.len())
            .finish_non_exhaustive()
    }
}
