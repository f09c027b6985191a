//! # sad-client
//!
//! Blocking client for the sadstate project/profile service.
//!
//! - [`Session`] owns the HTTP transport, the current auth id and an identity
//!   cache that keeps one live object per project or profile id
//! - [`Project`] and [`Profile`] are handles on cached mirrors; each method
//!   sends one request and applies the resulting local change
//! - Every call returns a [`Response`] classified by a per-operation decision
//!   table (see [`Operation::rules`]); only local failures are [`ClientError`]
//!
//! # Usage
//!
//! ```no_run
//! use sad_client::{Response, Session};
//!
//! let session = Session::new("https://sad.example.org")?;
//! session.authenticate(7, "hunter2")?;
//! if let Response::Project { project, .. } = session.get_project("notes")? {
//!     let main = project.get_profile("main")?;
//!     if let Some(profile) = main.profile() {
//!         profile.append("another line\n")?;
//!     }
//! }
//! # Ok::<(), sad_client::ClientError>(())
//! ```

mod cache;
pub mod classify;
mod content;
mod entity;
mod error;
mod profile;
mod project;
mod response;
mod session;
pub mod transport;

pub use classify::{Failure, Operation, permission_from_body};
pub use content::Content;
pub use entity::{Edit, EntityRecord};
pub use error::{ClientError, EntityKind};
pub use profile::{Profile, ProfileEdit};
pub use project::{Project, ProjectEdit};
pub use response::{RequiredPermission, Response};
pub use session::Session;
pub use transport::{ApiRequest, HttpTransport, Method, Reply, Transport};

pub use sad_core::{
    AuthId, EntityId, PermissionDomain, PermissionMap, PermissionSet, ProfilePermissions,
    ProjectPermissions,
};
