//! The auth collaborator as seen by the session manager.

use async_trait::async_trait;
use plate_core::{AuthChangeEvent, AuthEvent, Identity, Session};

use crate::error::AuthError;
use crate::events::{AuthEvents, Subscription};

/// Result of a sign-up. `session` is `None` when the service requires email
/// confirmation before issuing credentials.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub identity: Identity,
    pub session: Option<Session>,
}

/// Hosted auth service.
///
/// Implementations own the session and announce every change through the
/// lifecycle stream returned by [`AuthBackend::subscribe`]. Credential calls
/// only return once the matching notification has been emitted.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Whether the service has the settings it needs to be contacted at all.
    fn is_configured(&self) -> bool;

    /// Register for lifecycle notifications. The first notification is
    /// always `INITIAL_SESSION` carrying the current session (or none).
    fn subscribe(&self) -> Subscription;

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError>;

    /// End the session locally (emitting `SIGNED_OUT`) and then remotely.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Exchange the refresh token for a new session (emitting `TOKEN_REFRESHED`).
    async fn refresh_session(&self) -> Result<Session, AuthError>;
}

/// Stand-in used when no backend settings are present. Every call fails with
/// [`AuthError::NotConfigured`].
#[derive(Default)]
pub struct UnconfiguredAuth {
    events: AuthEvents,
}

impl UnconfiguredAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthBackend for UnconfiguredAuth {
    fn is_configured(&self) -> bool {
        false
    }

    fn subscribe(&self) -> Subscription {
        self.events
            .subscribe_with(AuthEvent::new(AuthChangeEvent::InitialSession, None))
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Session, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn refresh_session(&self) -> Result<Session, AuthError> {
        Err(AuthError::NotConfigured)
    }
}
