use serde::{Deserialize, Serialize};

use crate::enums::AuthChangeEvent;
use crate::identity::{Identity, Session};

/// An auth lifecycle notification delivered by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEvent {
    pub kind: AuthChangeEvent,
    pub session: Option<Session>,
}

impl AuthEvent {
    #[must_use]
    pub const fn new(kind: AuthChangeEvent, session: Option<Session>) -> Self {
        Self { kind, session }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self::new(AuthChangeEvent::SignedOut, None)
    }

    /// Identity carried by the notification, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.session.as_ref().map(Session::identity)
    }
}
