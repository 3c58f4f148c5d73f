use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::enums::AuthPhase;
use crate::identity::{Identity, Session};
use crate::profile::Profile;

/// Read-only view of the session layer handed to consumers.
///
/// Serializes without token material: the `session` field only exposes its
/// expiry and token type. `is_loading` and `is_authenticated` are included
/// as derived fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: AuthPhase,
    pub identity: Option<Identity>,
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    /// Set once a profile resolution for the current identity has finished,
    /// whatever its outcome. `profile` is final for this identity from then on.
    pub profile_resolved: bool,
    pub is_configured: bool,
}

impl SessionSnapshot {
    /// Snapshot before the manager has been mounted.
    #[must_use]
    pub const fn uninitialized(is_configured: bool) -> Self {
        Self::with_phase(AuthPhase::Uninitialized, is_configured)
    }

    /// Snapshot while waiting for the first lifecycle notification.
    #[must_use]
    pub const fn loading(is_configured: bool) -> Self {
        Self::with_phase(AuthPhase::Loading, is_configured)
    }

    /// Snapshot with no identity.
    #[must_use]
    pub const fn anonymous(is_configured: bool) -> Self {
        Self::with_phase(AuthPhase::Anonymous, is_configured)
    }

    const fn with_phase(phase: AuthPhase, is_configured: bool) -> Self {
        Self {
            phase,
            identity: None,
            session: None,
            profile: None,
            profile_resolved: false,
            is_configured,
        }
    }

    /// Snapshot for an authenticated identity with no profile resolved yet.
    #[must_use]
    pub const fn authenticated(
        identity: Identity,
        session: Option<Session>,
        is_configured: bool,
    ) -> Self {
        Self {
            phase: AuthPhase::Authenticated,
            identity: Some(identity),
            session,
            profile: None,
            profile_resolved: false,
            is_configured,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.phase.is_pending()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Signed in, but the profile lookup has not finished yet.
    #[must_use]
    pub const fn is_profile_pending(&self) -> bool {
        self.is_authenticated() && !self.profile_resolved
    }

    #[must_use]
    pub fn identity_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.id.as_str())
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.access_token.as_str())
    }
}

#[derive(Serialize)]
struct SessionSummary<'a> {
    token_type: &'a str,
    expires_at: DateTime<Utc>,
}

impl Serialize for SessionSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let session = self.session.as_ref().map(|session| SessionSummary {
            token_type: &session.token_type,
            expires_at: session.expires_at,
        });

        let mut state = serializer.serialize_struct("SessionSnapshot", 8)?;
        state.serialize_field("phase", &self.phase)?;
        state.serialize_field("is_loading", &self.is_loading())?;
        state.serialize_field("is_authenticated", &self.is_authenticated())?;
        state.serialize_field("is_configured", &self.is_configured)?;
        state.serialize_field("identity", &self.identity)?;
        state.serialize_field("session", &session)?;
        state.serialize_field("profile", &self.profile)?;
        state.serialize_field("profile_resolved", &self.profile_resolved)?;
        state.end()
    }
}
