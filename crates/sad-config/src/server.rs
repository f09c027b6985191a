//! Remote service connection settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("sadstate/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base URL of the service (e.g., `https://sad.example.org`), no trailing slash.
    #[serde(default)]
    pub host: String,

    /// Per-request timeout, in seconds. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    /// Check if a host has been set.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
    }

    /// Host with any trailing slash removed, validated to carry an http(s) scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when no host is set and
    /// [`ConfigError::InvalidValue`] when the scheme is missing.
    pub fn base_url(&self) -> Result<&str, ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "server".into(),
            });
        }
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "server.host".into(),
                reason: format!("'{}' has no http:// or https:// scheme", self.host),
            });
        }
        Ok(self.host.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = ServerConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("sadstate/"));
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = ServerConfig {
            host: "https://sad.example.org/".into(),
            ..Default::default()
        };
        assert_eq!(config.base_url().unwrap(), "https://sad.example.org");
    }

    #[test]
    fn base_url_requires_scheme() {
        let config = ServerConfig {
            host: "sad.example.org".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
