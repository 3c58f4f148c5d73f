//! Session lifecycle tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Ceiling on how long the store may stay in `loading`.
const fn default_loading_timeout_ms() -> u64 {
    5_000
}

/// Pause between an identity change and the profile lookup.
const fn default_settle_delay_ms() -> u64 {
    150
}

/// How long before expiry the access token is refreshed.
const fn default_refresh_margin_secs() -> i64 {
    60
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Forces `loading → anonymous` if no lifecycle notification arrives in time.
    #[serde(default = "default_loading_timeout_ms")]
    pub loading_timeout_ms: u64,

    /// Settling delay before a profile lookup, letting the auth service finish
    /// committing a freshly issued token.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Refresh the access token this many seconds before it expires.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,

    /// Whether to refresh access tokens in the background.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,

    /// Whether to persist the session (keyring, falling back to a file).
    #[serde(default = "default_true")]
    pub persist: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            loading_timeout_ms: default_loading_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            refresh_margin_secs: default_refresh_margin_secs(),
            auto_refresh: true,
            persist: true,
        }
    }
}

impl SessionConfig {
    pub const fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }

    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
