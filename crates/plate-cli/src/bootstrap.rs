use std::path::Path;

use anyhow::Context;
use plate_config::PlateConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then the layered config, then apply CLI overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<PlateConfig> {
    load_dotenv()?;

    let mut config = PlateConfig::load().context("failed to load plate configuration")?;
    if let Some(app) = flags.app {
        config.app.kind = app;
    }
    config
        .validate()
        .context("invalid plate configuration")?;
    Ok(config)
}

/// Load the nearest `.env` walking up from the current directory, if any.
fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let Some(env_path) = find_dotenv(&cwd) else {
        return Ok(());
    };
    dotenvy::from_path(&env_path)
        .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))
}

fn find_dotenv(start: &Path) -> Option<std::path::PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}
