use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in principal as reported by the hosted auth service.
///
/// The client only ever holds a read-only copy. It is replaced whenever the
/// auth service issues a new session and dropped on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Auth service user ID (UUID string).
    pub id: String,
    /// Primary email, if the account has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Provenance of the identity (e.g. `"email"`), from `app_metadata.provider`.
    #[serde(default)]
    pub provider: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
            provider: None,
        }
    }
}

/// Credential bundle issued by the hosted auth service.
///
/// A session always carries its owning [`Identity`], so a session without a
/// live identity cannot be represented. Only the auth collaborator builds
/// these (from a wire response or from persisted storage).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: Identity,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Identity owning this session.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.user
    }

    /// Check if the session is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        let threshold = Utc::now() + chrono::TimeDelta::seconds(buffer_secs);
        self.expires_at <= threshold
    }

    /// Check if the session has already expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_near_expiry(0)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}
