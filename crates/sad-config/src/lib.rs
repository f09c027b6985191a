//! # sad-config
//!
//! Layered configuration loading for sadstate using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SADSTATE_*` prefix, `__` as separator)
//! 2. Project-level `.sadstate/config.toml`
//! 3. User-level `~/.config/sadstate/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SADSTATE_SERVER__HOST` -> `server.host`, `SADSTATE_AUTH__ID` -> `auth.id`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sad_config::SadConfig;
//!
//! let config = SadConfig::load_with_dotenv().expect("config");
//! if config.server.is_configured() {
//!     println!("host: {}", config.server.host);
//! }
//! ```

mod auth;
mod error;
mod server;

pub use auth::AuthConfig;
pub use error::ConfigError;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SadConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl SadConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT read `.env` -- use [`Self::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers and tests can layer extra providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".sadstate/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SADSTATE_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sadstate").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = SadConfig::default();
        assert!(!config.server.is_configured());
        assert!(!config.auth.is_configured());
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: SadConfig = SadConfig::figment().extract()?;
            assert_eq!(config.server.timeout_secs, 30);
            assert!(config.auth.id.is_none());
            Ok(())
        });
    }
}
