//! Scriptable collaborators for session manager tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use plate_auth::{
    AuthBackend, AuthError, AuthEvents, LookupError, ProfileSource, QueryCache, SessionManager,
    SessionOptions, SignUpDetails, SignUpOutcome, Subscription,
};
use plate_core::{AppKind, AuthChangeEvent, AuthEvent, CustomerProfile, Identity, Profile, Session};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn session(user_id: &str, token: &str) -> Session {
    Session {
        access_token: token.to_string(),
        refresh_token: Some(format!("refresh-{token}")),
        token_type: "bearer".into(),
        expires_at: Utc::now() + TimeDelta::hours(1),
        user: Identity::new(user_id, Some(format!("{user_id}@plate.test"))),
    }
}

pub fn customer(user_id: &str, display_name: &str) -> Profile {
    Profile::Customer(CustomerProfile {
        user_id: user_id.to_string(),
        display_name: Some(display_name.to_string()),
        username: None,
        avatar_url: None,
        bio: None,
    })
}

pub fn options(app: AppKind) -> SessionOptions {
    SessionOptions {
        app,
        loading_timeout: Duration::from_millis(5000),
        settle_delay: Duration::from_millis(150),
    }
}

/// Manager over fresh fakes, not yet mounted.
pub struct Harness {
    pub auth: Arc<FakeAuth>,
    pub source: Arc<FakeSource>,
    pub cache: Arc<CountingCache>,
    pub manager: SessionManager,
}

impl Harness {
    pub fn new(auth: FakeAuth, source: FakeSource) -> Self {
        Self::with_options(auth, source, options(AppKind::Webapp))
    }

    pub fn with_options(auth: FakeAuth, source: FakeSource, options: SessionOptions) -> Self {
        let auth = Arc::new(auth);
        let source = Arc::new(source);
        let cache = Arc::new(CountingCache::default());
        let manager = SessionManager::new(auth.clone(), source.clone(), cache.clone(), options);
        Self {
            auth,
            source,
            cache,
            manager,
        }
    }
}

/// Let spawned tasks run until they block on something other than the
/// scheduler.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Auth backend
// ---------------------------------------------------------------------------

/// In-memory auth backend. Credentials registered with [`FakeAuth::accept`]
/// sign in; anything else is rejected the way the hosted service rejects it.
pub struct FakeAuth {
    configured: bool,
    silent: bool,
    events: AuthEvents,
    current: Mutex<Option<Session>>,
    accounts: Mutex<HashMap<(String, String), Session>>,
    sign_in_error: Mutex<Option<AuthError>>,
    sign_out_error: Mutex<Option<AuthError>>,
    pub subscribe_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl FakeAuth {
    pub fn configured() -> Self {
        Self {
            configured: true,
            silent: false,
            events: AuthEvents::new(),
            current: Mutex::new(None),
            accounts: Mutex::new(HashMap::new()),
            sign_in_error: Mutex::new(None),
            sign_out_error: Mutex::new(None),
            subscribe_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::configured()
        }
    }

    /// Backend that never sends `INITIAL_SESSION`.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::configured()
        }
    }

    /// Backend that already holds `session` when the manager subscribes.
    pub fn with_session(session: Session) -> Self {
        let auth = Self::configured();
        *auth.current.lock().unwrap() = Some(session);
        auth
    }

    pub fn accept(&self, email: &str, password: &str, session: Session) {
        self.accounts
            .lock()
            .unwrap()
            .insert((email.to_string(), password.to_string()), session);
    }

    pub fn fail_sign_in_with(&self, error: AuthError) {
        *self.sign_in_error.lock().unwrap() = Some(error);
    }

    pub fn fail_sign_out_with(&self, error: AuthError) {
        *self.sign_out_error.lock().unwrap() = Some(error);
    }

    /// Deliver a lifecycle notification as the hosted service would.
    pub fn emit(&self, kind: AuthChangeEvent, session: Option<Session>) {
        let mut current = self.current.lock().unwrap();
        match kind {
            AuthChangeEvent::SignedOut => *current = None,
            ref k if k.carries_session() => current.clone_from(&session),
            _ => {}
        }
        self.events.emit(&AuthEvent::new(kind, session));
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn subscribe(&self) -> Subscription {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.silent {
            return self.events.subscribe();
        }
        let current = self.current.lock().unwrap();
        self.events.subscribe_with(AuthEvent::new(
            AuthChangeEvent::InitialSession,
            current.clone(),
        ))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if !self.configured {
            return Err(AuthError::NotConfigured);
        }
        if let Some(error) = self.sign_in_error.lock().unwrap().take() {
            return Err(error);
        }
        let session = self
            .accounts
            .lock()
            .unwrap()
            .get(&(email.to_string(), password.to_string()))
            .cloned()
            .ok_or_else(|| AuthError::Rejected("Invalid login credentials".into()))?;
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError> {
        if !self.configured {
            return Err(AuthError::NotConfigured);
        }
        let mut session = session("new-user", "signup-token");
        session.user.email = Some(email.to_string());
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(SignUpOutcome {
            identity: session.user.clone(),
            session: Some(session),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.emit(AuthChangeEvent::SignedOut, None);
        match self.sign_out_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn refresh_session(&self) -> Result<Session, AuthError> {
        Err(AuthError::NoSession)
    }
}

// ---------------------------------------------------------------------------
// Profile source
// ---------------------------------------------------------------------------

/// Profile rows held in memory, with an optional per-identity lookup delay.
#[derive(Default)]
pub struct FakeSource {
    app: AppKind,
    rows: Mutex<HashMap<String, Profile>>,
    delays: Mutex<HashMap<String, Duration>>,
    fail_upsert: bool,
    pub lookups: Mutex<Vec<(String, String)>>,
    pub upserts: AtomicUsize,
}

impl FakeSource {
    pub fn webapp() -> Self {
        Self {
            app: AppKind::Webapp,
            ..Self::default()
        }
    }

    pub fn console() -> Self {
        Self {
            app: AppKind::Console,
            ..Self::default()
        }
    }

    pub fn failing_upserts(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    pub fn with_row(self, profile: Profile) -> Self {
        self.insert(profile);
        self
    }

    pub fn insert(&self, profile: Profile) {
        self.rows
            .lock()
            .unwrap()
            .insert(profile.user_id().to_string(), profile);
    }

    pub fn delay(&self, identity_id: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(identity_id.to_string(), delay);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn lookups_for(&self, identity_id: &str) -> usize {
        self.lookups
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == identity_id)
            .count()
    }
}

#[async_trait]
impl ProfileSource for FakeSource {
    fn app_kind(&self) -> AppKind {
        self.app
    }

    async fn lookup(&self, identity_id: &str, access_token: &str) -> Result<Profile, LookupError> {
        self.lookups
            .lock()
            .unwrap()
            .push((identity_id.to_string(), access_token.to_string()));
        let delay = self.delays.lock().unwrap().get(identity_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.rows
            .lock()
            .unwrap()
            .get(identity_id)
            .cloned()
            .ok_or(LookupError::NotFound)
    }

    async fn upsert(
        &self,
        identity: &Identity,
        details: &SignUpDetails,
        _access_token: Option<&str>,
    ) -> Result<(), LookupError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert {
            return Err(LookupError::Status {
                status: 503,
                body: "upstream unavailable".into(),
            });
        }
        let mut row = details.profile_row(self.app, identity);
        // The data store assigns the primary key of business rows.
        if self.app == AppKind::Console {
            row["id"] = format!("row-{}", identity.id).into();
        }
        let profile =
            Profile::from_row(self.app, row).map_err(|e| LookupError::Decode(e.to_string()))?;
        self.insert(profile);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Query cache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CountingCache {
    pub invalidations: AtomicUsize,
    pub clears: AtomicUsize,
}

impl CountingCache {
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl QueryCache for CountingCache {
    fn invalidate_all(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}
