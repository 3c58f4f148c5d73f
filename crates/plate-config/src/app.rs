//! Application selection.

use plate_core::AppKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Which app the session layer serves (`console` or `webapp`).
    #[serde(default)]
    pub kind: AppKind,

    /// Override for the profile table. Empty means the app kind's default.
    #[serde(default)]
    pub profile_table: String,
}

impl AppConfig {
    /// Table holding profile rows for the configured app.
    pub fn profile_table(&self) -> &str {
        if self.profile_table.trim().is_empty() {
            self.kind.profile_table()
        } else {
            self.profile_table.trim()
        }
    }
}
