//! Lifecycle event kinds, session phases, business roles, and app kinds.
//!
//! Wire-facing enums serialize the way the hosted services spell them:
//! lifecycle kinds are `SCREAMING_SNAKE_CASE`, roles and app kinds lower-case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// AuthChangeEvent
// ---------------------------------------------------------------------------

/// Kind tag carried by an auth lifecycle notification.
///
/// Kinds the session layer does not act on are preserved in [`Self::Other`]
/// so they can be logged and ignored instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
    MfaChallengeVerified,
    Other(String),
}

impl AuthChangeEvent {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "INITIAL_SESSION" => Self::InitialSession,
            "SIGNED_IN" => Self::SignedIn,
            "SIGNED_OUT" => Self::SignedOut,
            "TOKEN_REFRESHED" => Self::TokenRefreshed,
            "USER_UPDATED" => Self::UserUpdated,
            "PASSWORD_RECOVERY" => Self::PasswordRecovery,
            "MFA_CHALLENGE_VERIFIED" => Self::MfaChallengeVerified,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
            Self::MfaChallengeVerified => "MFA_CHALLENGE_VERIFIED",
            Self::Other(other) => other,
        }
    }

    /// Kinds that carry a (possibly absent) session the store should adopt.
    #[must_use]
    pub const fn carries_session(&self) -> bool {
        matches!(
            self,
            Self::InitialSession | Self::SignedIn | Self::TokenRefreshed
        )
    }
}

impl From<String> for AuthChangeEvent {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AuthChangeEvent> for String {
    fn from(value: AuthChangeEvent) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuthPhase
// ---------------------------------------------------------------------------

/// Phase of the identity store.
///
/// ```text
/// uninitialized → loading → authenticated ⇄ anonymous
/// ```
///
/// There is no terminal phase; the store lives as long as its manager is
/// mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

impl AuthPhase {
    /// Valid next phases from the current phase.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Uninitialized => &[Self::Loading, Self::Authenticated],
            Self::Loading => &[Self::Authenticated, Self::Anonymous],
            Self::Authenticated => &[Self::Authenticated, Self::Anonymous],
            Self::Anonymous => &[Self::Authenticated, Self::Anonymous],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether the "who is signed in" determination is still pending.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Authenticated => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BusinessRole
// ---------------------------------------------------------------------------

/// Role of a console user within their business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessRole {
    Owner,
    Manager,
    Staff,
}

impl BusinessRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Staff => "staff",
        }
    }

    /// Owners and managers may change business settings.
    #[must_use]
    pub const fn can_manage(self) -> bool {
        matches!(self, Self::Owner | Self::Manager)
    }
}

impl FromStr for BusinessRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "manager" => Ok(Self::Manager),
            "staff" => Ok(Self::Staff),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for BusinessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AppKind
// ---------------------------------------------------------------------------

/// Which application the session layer serves.
///
/// The console resolves [`crate::BusinessUser`] records, the webapp resolves
/// [`crate::CustomerProfile`] records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    #[default]
    Console,
    Webapp,
}

impl AppKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Webapp => "webapp",
        }
    }

    /// Default table holding this app's profile rows.
    #[must_use]
    pub const fn profile_table(self) -> &'static str {
        match self {
            Self::Console => "business_users",
            Self::Webapp => "profiles",
        }
    }
}

impl FromStr for AppKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(Self::Console),
            "webapp" => Ok(Self::Webapp),
            other => Err(CoreError::InvalidAppKind(other.to_string())),
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
