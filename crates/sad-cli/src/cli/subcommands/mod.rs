mod auth;
mod profile;
mod project;

pub use auth::AuthCommands;
pub use profile::{ProfileCommands, ProfileEditArgs, ProfileUploadArgs};
pub use project::{ProjectCommands, ProjectEditArgs};
