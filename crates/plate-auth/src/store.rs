//! Identity store: the single source of truth for "who is signed in".
//!
//! A pure state machine over lifecycle notifications. It performs no I/O;
//! the session manager feeds it notifications in arrival order and acts on
//! the returned [`Transition`].

use plate_core::{AuthChangeEvent, AuthEvent, AuthPhase, Identity, Session};

/// What applying a notification did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The notification kind is not one the store acts on.
    Ignored,
    /// A session was adopted.
    Authenticated {
        identity_changed: bool,
        session_changed: bool,
    },
    /// A session-bearing notification arrived without a session.
    Anonymous { was_signed_in: bool },
    /// `SIGNED_OUT` was applied.
    SignedOut { was_signed_in: bool },
}

impl Transition {
    /// Whether identity-derived state (profile, cache) must be dropped.
    #[must_use]
    pub const fn clears_identity(self) -> bool {
        matches!(
            self,
            Self::Anonymous {
                was_signed_in: true
            } | Self::SignedOut {
                was_signed_in: true
            }
        )
    }
}

#[derive(Debug, Clone)]
pub struct IdentityStore {
    phase: AuthPhase,
    identity: Option<Identity>,
    session: Option<Session>,
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: AuthPhase::Uninitialized,
            identity: None,
            session: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        self.phase
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// `uninitialized → loading`. Returns `false` if already past it.
    pub fn begin_loading(&mut self) -> bool {
        self.move_to(AuthPhase::Loading)
    }

    /// Force `loading → anonymous` when no notification arrived in time.
    /// Returns `false` if the store had already left `loading`.
    pub fn expire_loading(&mut self) -> bool {
        if self.phase != AuthPhase::Loading {
            return false;
        }
        self.move_to(AuthPhase::Anonymous)
    }

    /// Adopt a synthetic identity without a session (demo mode).
    pub fn enter_demo(&mut self, identity: Identity) {
        self.identity = Some(identity);
        self.session = None;
        self.phase = AuthPhase::Authenticated;
    }

    /// Apply one lifecycle notification.
    pub fn apply(&mut self, event: &AuthEvent) -> Transition {
        match &event.kind {
            AuthChangeEvent::SignedOut => {
                let was_signed_in = self.clear();
                Transition::SignedOut { was_signed_in }
            }
            kind if kind.carries_session() => match &event.session {
                Some(session) => self.adopt(session.clone()),
                None => {
                    let was_signed_in = self.clear();
                    Transition::Anonymous { was_signed_in }
                }
            },
            _ => Transition::Ignored,
        }
    }

    fn adopt(&mut self, session: Session) -> Transition {
        let identity_changed = self
            .identity
            .as_ref()
            .is_none_or(|current| current.id != session.user.id);
        let session_changed = self
            .session
            .as_ref()
            .is_none_or(|current| current.access_token != session.access_token);

        self.identity = Some(session.user.clone());
        self.session = Some(session);
        self.phase = AuthPhase::Authenticated;

        Transition::Authenticated {
            identity_changed,
            session_changed,
        }
    }

    /// Drop identity and session. Returns whether there was anything to drop.
    fn clear(&mut self) -> bool {
        let was_signed_in = self.identity.is_some();
        self.identity = None;
        self.session = None;
        self.phase = AuthPhase::Anonymous;
        was_signed_in
    }

    fn move_to(&mut self, next: AuthPhase) -> bool {
        if !self.phase.can_transition_to(next) || self.phase == next {
            return false;
        }
        self.phase = next;
        true
    }
}
