use plate_config::PlateConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &PlateConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &PlateConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.backend.is_configured() && has_env_prefix(&env_keys, "PLATE_BACKEND") {
        warnings.push(
            "Backend config appears incomplete while PLATE_BACKEND* env vars exist. Use double underscores and set both (PLATE_BACKEND__URL, PLATE_BACKEND__ANON_KEY). Running in demo mode."
                .to_string(),
        );
    }

    if has_env_prefix(&env_keys, "PLATE_SESSION_") && !has_env_prefix(&env_keys, "PLATE_SESSION__") {
        warnings.push(
            "PLATE_SESSION* env vars are ignored without a double underscore (example: PLATE_SESSION__SETTLE_DELAY_MS)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
