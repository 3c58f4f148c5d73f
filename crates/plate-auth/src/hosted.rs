//! Hosted auth service client.
//!
//! Calls the auth REST API directly via `reqwest`:
//! - `POST /token?grant_type=password`: password sign-in
//! - `POST /token?grant_type=refresh_token`: session refresh
//! - `POST /signup`: account creation
//! - `POST /logout`: remote session revocation
//!
//! The client owns the current session, persists it through an optional
//! [`SessionStore`], and announces every change on its lifecycle stream.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use plate_config::PlateConfig;
use plate_core::{AuthChangeEvent, AuthEvent, Identity, Session};
use serde::Deserialize;

use crate::backend::{AuthBackend, SignUpOutcome};
use crate::error::AuthError;
use crate::events::{AuthEvents, Subscription};
use crate::lock;
use crate::refresh::decode_expiry;
use crate::session_store::SessionStore;

/// Lifetime assumed when a token response carries no expiry at all.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

pub struct HostedAuth {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    events: AuthEvents,
    current: Mutex<Option<Session>>,
    store: Option<SessionStore>,
}

impl HostedAuth {
    /// Client for the auth service at `auth_url` (e.g. `https://x.supabase.co/auth/v1`).
    #[must_use]
    pub fn new(auth_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            events: AuthEvents::new(),
            current: Mutex::new(None),
            store: None,
        }
    }

    /// Client configured from `config.backend`, persisting sessions when
    /// `config.session.persist` is set.
    #[must_use]
    pub fn from_config(config: &PlateConfig) -> Self {
        let auth = Self::new(config.backend.auth_url(), config.backend.anon_key.clone());
        if !config.session.persist {
            return auth;
        }
        match SessionStore::default_location() {
            Ok(store) => auth.with_session_store(store),
            Err(error) => {
                tracing::warn!(%error, "session persistence disabled");
                auth
            }
        }
    }

    /// Persist sessions in `store`, adopting the session already stored there
    /// unless it has expired.
    #[must_use]
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        let restored = store.load().filter(|session| {
            let usable = !session.is_expired();
            if !usable {
                tracing::info!(user_id = %session.user.id, "persisted session expired; discarding it");
            }
            usable
        });
        if let Some(session) = &restored {
            tracing::debug!(user_id = %session.user.id, "restored persisted session");
        } else if let Err(error) = store.delete() {
            tracing::warn!(%error, "failed to remove stale persisted session");
        }
        *lock(&self.current) = restored;
        self.store = Some(store);
        self
    }

    /// Session currently held by the client (local read, no network).
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        lock(&self.current).clone()
    }

    #[must_use]
    pub const fn session_store(&self) -> Option<&SessionStore> {
        self.store.as_ref()
    }

    /// Replace the current session, persist it, and announce `kind`.
    ///
    /// The lock is held across persist and emit so that concurrent changes
    /// are announced in the order they were committed.
    fn commit(&self, kind: AuthChangeEvent, session: Option<Session>) {
        let mut current = lock(&self.current);
        if let Some(store) = &self.store {
            let persisted = match &session {
                Some(session) => store.store(session),
                None => store.delete(),
            };
            if let Err(error) = persisted {
                tracing::warn!(%error, "failed to persist session change");
            }
        }
        current.clone_from(&session);
        self.events.emit(&AuthEvent::new(kind, session));
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/token?grant_type={grant_type}", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("{grant_type} grant: {e}")))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Unknown(format!("parse {grant_type} grant: {e}")))?;
        Ok(token.into_session())
    }
}

#[async_trait]
impl AuthBackend for HostedAuth {
    fn is_configured(&self) -> bool {
        self.auth_url.starts_with("http") && !self.anon_key.trim().is_empty()
    }

    fn subscribe(&self) -> Subscription {
        // Hold the session lock so no commit slips between the read and the
        // registration.
        let current = lock(&self.current);
        let subscription = self.events.subscribe_with(AuthEvent::new(
            AuthChangeEvent::InitialSession,
            current.clone(),
        ));
        tracing::debug!(
            subscribers = self.events.subscriber_count(),
            has_session = current.is_some(),
            "hosted auth: new lifecycle subscriber"
        );
        subscription
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let session = self
            .token_grant(
                "password",
                serde_json::json!({"email": email, "password": password}),
            )
            .await?;
        tracing::info!(user_id = %session.user.id, "signed in");
        self.commit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError> {
        let url = format!("{}/signup", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("sign up: {e}")))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AuthError::Unknown(format!("parse sign up: {e}")))?;
        let outcome = parse_sign_up(body)?;

        match &outcome.session {
            Some(session) => {
                tracing::info!(user_id = %session.user.id, "signed up and signed in");
                self.commit(AuthChangeEvent::SignedIn, Some(session.clone()));
            }
            None => {
                tracing::info!(user_id = %outcome.identity.id, "signed up; awaiting email confirmation");
            }
        }
        Ok(outcome)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.current_session();
        self.commit(AuthChangeEvent::SignedOut, None);

        let Some(session) = previous else {
            return Ok(());
        };

        let url = format!("{}/logout", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("sign out: {e}")))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        tracing::info!(user_id = %session.user.id, "signed out");
        Ok(())
    }

    async fn refresh_session(&self) -> Result<Session, AuthError> {
        let refresh_token = self
            .current_session()
            .and_then(|session| session.refresh_token)
            .ok_or(AuthError::NoSession)?;

        let session = self
            .token_grant(
                "refresh_token",
                serde_json::json!({"refresh_token": refresh_token}),
            )
            .await?;
        tracing::debug!(user_id = %session.user.id, expires_at = %session.expires_at, "session refreshed");
        self.commit(AuthChangeEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    user: WireUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = resolve_expiry(
            self.expires_at,
            &self.access_token,
            self.expires_in,
            Utc::now(),
        );
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
            expires_at,
            user: self.user.into_identity(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: serde_json::Value,
}

impl WireUser {
    fn into_identity(self) -> Identity {
        let provider = self.app_metadata["provider"].as_str().map(String::from);
        Identity {
            id: self.id,
            email: self.email.filter(|email| !email.is_empty()),
            provider,
        }
    }
}

/// Expiry from, in order: explicit `expires_at`, the token's `exp` claim,
/// `now + expires_in`.
fn resolve_expiry(
    expires_at: Option<i64>,
    access_token: &str,
    expires_in: Option<i64>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    expires_at
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .or_else(|| decode_expiry(access_token).ok())
        .unwrap_or_else(|| {
            now + TimeDelta::seconds(expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
        })
}

/// Sign-up responds with a full token response when the account is
/// auto-confirmed, otherwise with the user (bare or under `user`).
fn parse_sign_up(body: serde_json::Value) -> Result<SignUpOutcome, AuthError> {
    if body.get("access_token").is_some_and(|t| !t.is_null()) {
        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::Unknown(format!("parse sign up session: {e}")))?;
        let session = token.into_session();
        return Ok(SignUpOutcome {
            identity: session.user.clone(),
            session: Some(session),
        });
    }

    let user = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    let user: WireUser = serde_json::from_value(user)
        .map_err(|e| AuthError::Unknown(format!("parse sign up user: {e}")))?;
    Ok(SignUpOutcome {
        identity: user.into_identity(),
        session: None,
    })
}

/// Map a non-2xx auth response: 4xx → `Rejected` with the service's own
/// message, anything else → `Network`.
async fn error_from_response(resp: reqwest::Response) -> AuthError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = extract_error_message(&body).unwrap_or_else(|| body.clone());

    if status.is_client_error() {
        AuthError::Rejected(message)
    } else {
        AuthError::Network(format!("HTTP {status}: {message}"))
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value[*key].as_str())
        .filter(|message| !message.is_empty())
        .map(String::from)
}
