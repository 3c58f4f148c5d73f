use figment::Jail;
use plate_config::PlateConfig;

#[test]
fn external_overrides_fill_config_values() {
    Jail::expect_with(|_jail| {
        let overrides = vec![
            (
                "PLATE_BACKEND__ANON_KEY".to_string(),
                "anon_from_external".to_string(),
            ),
            (
                "PLATE_SESSION__SETTLE_DELAY_MS".to_string(),
                "400".to_string(),
            ),
        ];

        let config = PlateConfig::load_with_env_overrides(&overrides).expect("config loads");
        assert_eq!(config.backend.anon_key, "anon_from_external");
        assert_eq!(config.session.settle_delay_ms, 400);
        Ok(())
    });
}

#[test]
fn process_env_beats_external_overrides() {
    Jail::expect_with(|jail| {
        jail.set_env("PLATE_BACKEND__ANON_KEY", "anon_from_env");
        let overrides = vec![(
            "PLATE_BACKEND__ANON_KEY".to_string(),
            "anon_from_external".to_string(),
        )];

        let config = PlateConfig::load_with_env_overrides(&overrides).expect("config loads");
        assert_eq!(config.backend.anon_key, "anon_from_env");
        Ok(())
    });
}

#[test]
fn overrides_without_prefix_are_ignored() {
    Jail::expect_with(|_jail| {
        let overrides = vec![(
            "SUPABASE_URL".to_string(),
            "https://ignored.example".to_string(),
        )];

        let config = PlateConfig::load_with_env_overrides(&overrides).expect("config loads");
        assert!(config.backend.url.is_empty());
        Ok(())
    });
}

#[test]
fn env_vars_configure_backend() {
    Jail::expect_with(|jail| {
        jail.set_env("PLATE_BACKEND__URL", "https://abcd.supabase.co");
        jail.set_env("PLATE_BACKEND__ANON_KEY", "anon-123");
        jail.set_env("PLATE_APP__KIND", "webapp");

        let config = PlateConfig::load().expect("config loads");
        assert!(config.backend.is_configured());
        assert_eq!(config.backend.rest_url(), "https://abcd.supabase.co/rest/v1");
        assert_eq!(config.app.kind, plate_core::AppKind::Webapp);
        assert_eq!(config.app.profile_table(), "profiles");
        Ok(())
    });
}
