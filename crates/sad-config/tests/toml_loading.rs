//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use sad_config::SadConfig;

#[test]
fn loads_server_and_auth_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[server]
host = "https://sad.example.org"
timeout_secs = 5
user_agent = "integration/1.0"

[auth]
id = 4242
password = "correct horse"
"#,
        )?;

        let config: SadConfig = Figment::from(Serialized::defaults(SadConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.server.host, "https://sad.example.org");
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.server.user_agent, "integration/1.0");
        assert_eq!(config.auth.id, Some(4242));
        assert_eq!(config.auth.password, "correct horse");
        assert!(config.auth.is_configured());
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[server]
host = "http://localhost:8080"
"#,
        )?;

        let config: SadConfig = Figment::from(Serialized::defaults(SadConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.server.base_url().unwrap(), "http://localhost:8080");
        assert_eq!(config.server.timeout_secs, 30);
        assert!(!config.auth.is_configured());
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".sadstate")?;
        jail.create_file(
            ".sadstate/config.toml",
            r#"
[server]
host = "https://local.example.org"
"#,
        )?;

        let config = SadConfig::load().expect("config loads");
        assert_eq!(config.server.host, "https://local.example.org");
        Ok(())
    });
}
