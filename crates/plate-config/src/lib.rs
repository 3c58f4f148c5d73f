//! # plate-config
//!
//! Layered configuration loading for plate using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PLATE_*` prefix, `__` as separator)
//! 2. External overrides passed by the caller (see [`PlateConfig::load_with_env_overrides`])
//! 3. Project-level `.plate/config.toml`
//! 4. User-level `~/.config/plate/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PLATE_BACKEND__URL` -> `backend.url`,
//! `PLATE_SESSION__SETTLE_DELAY_MS` -> `session.settle_delay_ms`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use plate_config::PlateConfig;
//!
//! let config = PlateConfig::load_with_dotenv().expect("config");
//!
//! if !config.backend.is_configured() {
//!     println!("running in demo mode");
//! }
//! ```

mod app;
mod backend;
mod error;
mod general;
mod session;

pub use app::AppConfig;
pub use backend::BackendConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use session::SessionConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_PREFIX: &str = "PLATE_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlateConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl PlateConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the CLI.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Load configuration with values supplied by an external source (a
    /// secrets manager, a parent process) layered under the process env.
    ///
    /// `overrides` are `PLATE_*` style key/value pairs. Real environment
    /// variables still win over them.
    pub fn load_with_env_overrides(overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut figment = Self::file_figment();
        for (key, value) in overrides {
            let Some(path) = env_key_to_path(key) else {
                continue;
            };
            let Ok(value) = value.parse::<Value>();
            figment = figment.merge(Serialized::default(&path, value));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        Self::file_figment().merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.is_configured()
            && !(self.backend.base_url().starts_with("https://")
                || self.backend.base_url().starts_with("http://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "backend.url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }
        if self.session.loading_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.loading_timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.session.refresh_margin_secs < 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.refresh_margin_secs".into(),
                reason: "must not be negative".into(),
            });
        }
        Ok(())
    }

    /// Backend section, or an error naming it when it is incomplete.
    pub fn require_backend(&self) -> Result<&BackendConfig, ConfigError> {
        if self.backend.is_configured() {
            Ok(&self.backend)
        } else {
            Err(ConfigError::NotConfigured {
                section: "backend".into(),
            })
        }
    }

    fn file_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".plate/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plate").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

/// `PLATE_SESSION__SETTLE_DELAY_MS` -> `session.settle_delay_ms`.
fn env_key_to_path(key: &str) -> Option<String> {
    let rest = key.strip_prefix(ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(
        rest.split("__")
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("."),
    )
}
