//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default log filter when neither `PLATE_LOG` nor CLI flags say otherwise.
fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default `tracing` filter directive (e.g., "info", "plate_auth=debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}
