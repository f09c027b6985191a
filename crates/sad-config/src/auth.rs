//! Stored credentials used to authenticate a session on startup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Auth id previously issued by `/auth/new`.
    #[serde(default)]
    pub id: Option<u64>,

    /// Password for `id`.
    #[serde(default)]
    pub password: String,
}

impl AuthConfig {
    /// Check if both an id and a password are available.
    pub fn is_configured(&self) -> bool {
        self.id.is_some() && !self.password.is_empty()
    }
}
