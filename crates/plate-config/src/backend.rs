//! Hosted backend (auth + REST data store) configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Project URL (e.g., `https://abcd.supabase.co`). Auth lives under
    /// `/auth/v1`, the data store under `/rest/v1`.
    #[serde(default)]
    pub url: String,

    /// Public anonymous API key sent as `apikey` on every request.
    #[serde(default)]
    pub anon_key: String,
}

impl BackendConfig {
    /// Check if the backend config has the minimum required fields.
    ///
    /// When this is false the session layer runs in demo mode.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }

    /// Base URL of the auth service.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base_url())
    }

    /// Base URL of the REST data store.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url())
    }
}
