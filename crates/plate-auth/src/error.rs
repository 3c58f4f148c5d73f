use thiserror::Error;

/// Errors surfaced by the auth collaborator and the session manager.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth backend is not configured: set PLATE_BACKEND__URL and PLATE_BACKEND__ANON_KEY")]
    NotConfigured,

    /// The auth service rejected the request (bad credentials, duplicate
    /// account, revoked refresh token). Carries the service's own message.
    #[error("{0}")]
    Rejected(String),

    #[error("auth request failed: {0}")]
    Network(String),

    #[error("no active session")]
    NoSession,

    /// Sign-up details that cannot produce a valid profile row. Raised
    /// before the account is created.
    #[error("invalid sign-up details: {0}")]
    InvalidSignUp(String),

    #[error("session store error: {0}")]
    SessionStore(String),

    #[error("unexpected auth error: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Whether the auth service itself refused the request.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Fold an error into the taxonomy sign-in callers see:
    /// `NotConfigured`, `Rejected`, or `Unknown`.
    #[must_use]
    pub fn into_sign_in_error(self) -> Self {
        match self {
            Self::NotConfigured | Self::Rejected(_) | Self::Unknown(_) => self,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Profile lookup failures. Absorbed by the resolver; never shown to consumers.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("data store request failed: {0}")]
    Network(String),

    #[error("data store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no profile row found")]
    NotFound,

    #[error("profile row failed validation: {0}")]
    Decode(String),
}
