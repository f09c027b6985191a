use figment::Jail;
use sad_config::SadConfig;

#[test]
fn env_sets_nested_values() {
    Jail::expect_with(|jail| {
        jail.set_env("SADSTATE_SERVER__HOST", "https://env.example.org");
        jail.set_env("SADSTATE_AUTH__ID", "77");
        jail.set_env("SADSTATE_AUTH__PASSWORD", "from-env");

        let config = SadConfig::load().expect("config loads");
        assert_eq!(config.server.host, "https://env.example.org");
        assert_eq!(config.auth.id, Some(77));
        assert_eq!(config.auth.password, "from-env");
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".sadstate")?;
        jail.create_file(
            ".sadstate/config.toml",
            r#"
[server]
host = "https://toml.example.org"
timeout_secs = 12
"#,
        )?;
        jail.set_env("SADSTATE_SERVER__HOST", "https://env.example.org");

        let config = SadConfig::load().expect("config loads");
        assert_eq!(config.server.host, "https://env.example.org");
        assert_eq!(config.server.timeout_secs, 12);
        Ok(())
    });
}

#[test]
fn malformed_env_value_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("SADSTATE_SERVER__TIMEOUT_SECS", "soon");
        assert!(SadConfig::load().is_err());
        Ok(())
    });
}
