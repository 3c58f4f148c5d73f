//! Session manager: the composition root of the session layer.
//!
//! One manager per app. It subscribes once to the auth backend's lifecycle
//! stream, feeds notifications to the [`IdentityStore`] in arrival order,
//! runs the [`ProfileResolver`] in a separate task after every committed
//! transition, and drives the [`CacheInvalidator`]. Consumers read
//! [`SessionSnapshot`]s through a `watch` channel.
//!
//! Cancellation uses two signals: a liveness flag flipped by
//! [`SessionManager::unmount`], and a generation counter bumped whenever the
//! identity changes or is cleared. A resolution only publishes if both still
//! match when it finishes.
//!
//! A local sign-out is applied ahead of the lifecycle queue. Until the
//! backend's own `SIGNED_OUT` comes through, session-bearing notifications
//! still queued from before the sign-out are dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use plate_config::PlateConfig;
use plate_core::{AppKind, AuthChangeEvent, AuthEvent, Identity, Profile, SessionSnapshot, demo};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::{AuthBackend, SignUpOutcome};
use crate::cache::{CacheInvalidator, QueryCache};
use crate::error::AuthError;
use crate::events::{Subscription, UnsubscribeHandle};
use crate::lock;
use crate::profile_source::{ProfileSource, SignUpDetails};
use crate::resolver::ProfileResolver;
use crate::store::{IdentityStore, Transition};

/// Tuning for a [`SessionManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub app: AppKind,
    /// Ceiling on the `loading` phase when no notification arrives.
    pub loading_timeout: Duration,
    /// Wait between an identity change and its profile lookup.
    pub settle_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            app: AppKind::default(),
            loading_timeout: Duration::from_millis(5000),
            settle_delay: Duration::from_millis(150),
        }
    }
}

impl SessionOptions {
    #[must_use]
    pub fn from_config(config: &PlateConfig) -> Self {
        Self {
            app: config.app.kind,
            loading_timeout: config.session.loading_timeout(),
            settle_delay: config.session.settle_delay(),
        }
    }
}

/// Cloneable handle to the session layer.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    auth: Arc<dyn AuthBackend>,
    resolver: Arc<ProfileResolver>,
    invalidator: CacheInvalidator,
    options: SessionOptions,
    store: Mutex<IdentityStore>,
    state: watch::Sender<SessionSnapshot>,
    generation: AtomicU64,
    alive: AtomicBool,
    /// Local sign-outs whose `SIGNED_OUT` has not come through the queue yet.
    /// Only changed under the store lock.
    pending_sign_outs: AtomicUsize,
    subscription: Mutex<Option<UnsubscribeHandle>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    resolution: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        source: Arc<dyn ProfileSource>,
        cache: Arc<dyn QueryCache>,
        options: SessionOptions,
    ) -> Self {
        let is_configured = auth.is_configured();
        let resolver = Arc::new(ProfileResolver::new(source, options.settle_delay));
        Self {
            inner: Arc::new(Inner {
                auth,
                resolver,
                invalidator: CacheInvalidator::new(cache),
                options,
                store: Mutex::new(IdentityStore::new()),
                state: watch::Sender::new(SessionSnapshot::uninitialized(is_configured)),
                generation: AtomicU64::new(0),
                alive: AtomicBool::new(false),
                pending_sign_outs: AtomicUsize::new(0),
                subscription: Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
                resolution: Mutex::new(None),
            }),
        }
    }

    /// Start tracking the session. Must be called from within a tokio runtime.
    ///
    /// With an unconfigured backend the demo identity and profile are
    /// published right away and the backend is never contacted. Otherwise
    /// the manager subscribes to the lifecycle stream and waits in `loading`
    /// for the first notification, at most `loading_timeout`.
    ///
    /// Mounting an already mounted manager does nothing.
    pub fn mount(&self) {
        let inner = &self.inner;
        if inner.alive.swap(true, Ordering::SeqCst) {
            tracing::debug!("session manager already mounted");
            return;
        }

        if !inner.auth.is_configured() {
            inner.enter_demo();
            return;
        }

        {
            let mut store = lock(&inner.store);
            store.begin_loading();
            inner.pending_sign_outs.store(0, Ordering::SeqCst);
            inner.state.send_replace(SessionSnapshot::loading(true));
        }

        let subscription = inner.auth.subscribe();
        *lock(&inner.subscription) = Some(subscription.handle());

        let events = tokio::spawn(run_event_loop(Arc::downgrade(inner), subscription));
        let timeout = tokio::spawn(run_loading_guard(
            Arc::downgrade(inner),
            inner.options.loading_timeout,
        ));
        lock(&inner.tasks).extend([events, timeout]);
        tracing::debug!(app = %inner.options.app, "session manager mounted");
    }

    /// Stop reacting to the backend. In-flight work finishing afterwards is
    /// discarded. The last published snapshot stays readable.
    pub fn unmount(&self) {
        self.inner.teardown();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> SessionSnapshot {
        let mut rx = self.watch();
        // The sender lives as long as `self`, so the channel cannot close.
        match rx.wait_for(|snapshot| predicate(snapshot)).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    #[must_use]
    pub fn app_kind(&self) -> AppKind {
        self.inner.options.app
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.auth.is_configured()
    }

    /// Exchange credentials with the backend.
    ///
    /// Local state changes only through the `SIGNED_IN` notification the
    /// backend emits on success. Returns the accepted identity; wait for it
    /// with [`wait_for`](Self::wait_for) before reading the snapshot.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without backend settings, `Rejected` carrying the
    /// service's message when it refuses the credentials, `Unknown` for
    /// anything else.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        match self.inner.auth.sign_in_with_password(email, password).await {
            Ok(session) => {
                tracing::debug!(user_id = %session.user.id, "sign-in accepted");
                Ok(session.user)
            }
            Err(error) => {
                tracing::info!(%error, "sign-in failed");
                Err(error.into_sign_in_error())
            }
        }
    }

    /// Create an account, then write its profile row.
    ///
    /// The profile write is best effort: a failure is logged and the
    /// sign-up still succeeds. [`refresh_profile`](Self::refresh_profile)
    /// picks the row up once it exists.
    ///
    /// # Errors
    ///
    /// `InvalidSignUp` when `details` cannot produce a valid profile row for
    /// this app (checked before the account is created). Otherwise the same
    /// taxonomy as [`sign_in`](Self::sign_in), for the account creation step
    /// only.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        details: &SignUpDetails,
    ) -> Result<SignUpOutcome, AuthError> {
        let source = self.inner.resolver.source();
        details.validate(source.app_kind())?;

        let outcome = self
            .inner
            .auth
            .sign_up(email, password, details.metadata())
            .await
            .map_err(|error| {
                tracing::info!(%error, "sign-up failed");
                error.into_sign_in_error()
            })?;

        let token = outcome
            .session
            .as_ref()
            .map(|session| session.access_token.as_str());
        match source.upsert(&outcome.identity, details, token).await {
            Ok(()) => {
                tracing::debug!(user_id = %outcome.identity.id, app = %source.app_kind(), "profile row written");
            }
            Err(error) => {
                tracing::warn!(user_id = %outcome.identity.id, %error, "profile write after sign-up failed");
            }
        }
        Ok(outcome)
    }

    /// Clear local state, then end the session remotely.
    ///
    /// The snapshot is anonymous and the cache cleared before this awaits
    /// anything. A remote failure is logged and not reported.
    pub async fn sign_out(&self) {
        self.inner.sign_out_locally();
        if let Err(error) = self.inner.auth.sign_out().await {
            tracing::warn!(%error, "remote sign-out failed; local session already cleared");
        }
    }

    /// Look the current identity's profile up again, bypassing the memo and
    /// the settling delay.
    ///
    /// Returns the profile now published, which is the previous one if the
    /// identity changed while the lookup was in flight.
    pub async fn refresh_profile(&self) -> Option<Profile> {
        let inner = &self.inner;
        let (identity_id, token, generation) = {
            let store = lock(&inner.store);
            let identity_id = store.identity()?.id.clone();
            let Some(token) = store.session().map(|s| s.access_token.clone()) else {
                return self.snapshot().profile;
            };
            let generation = inner.supersede_resolution();
            (identity_id, token, generation)
        };

        let profile = inner.resolver.refresh(&identity_id, &token).await;
        inner.publish_profile(generation, &identity_id, profile);
        self.snapshot().profile
    }
}

async fn run_event_loop(weak: Weak<Inner>, mut subscription: Subscription) {
    while let Some(event) = subscription.recv().await {
        let Some(inner) = weak.upgrade() else {
            break;
        };
        if !inner.alive.load(Ordering::SeqCst) {
            break;
        }
        inner.apply_queued(&event);
    }
    tracing::trace!("session event loop finished");
}

async fn run_loading_guard(weak: Weak<Inner>, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    let Some(inner) = weak.upgrade() else {
        return;
    };
    if !inner.alive.load(Ordering::SeqCst) {
        return;
    }
    let mut store = lock(&inner.store);
    if store.expire_loading() {
        tracing::warn!(?timeout, "no session notification received; continuing anonymous");
        inner.state.send_replace(SessionSnapshot::anonymous(true));
    }
}

impl Inner {
    fn enter_demo(&self) {
        let identity = demo::identity();
        let profile = demo::profile(self.options.app);
        {
            let mut store = lock(&self.store);
            store.enter_demo(identity.clone());
            let mut snapshot = SessionSnapshot::authenticated(identity, None, false);
            snapshot.profile = Some(profile.clone());
            snapshot.profile_resolved = true;
            self.state.send_replace(snapshot);
        }
        tracing::info!(app = %self.options.app, "auth backend not configured; running in demo mode");
        self.invalidator.on_profile_resolved(Some(&profile));
    }

    /// Clear local state ahead of the backend's `SIGNED_OUT`.
    fn sign_out_locally(self: &Arc<Self>) {
        let mut store = lock(&self.store);
        if lock(&self.subscription).is_some() {
            self.pending_sign_outs.fetch_add(1, Ordering::SeqCst);
        }
        self.commit(&mut store, &AuthEvent::signed_out());
    }

    /// Apply a notification taken from the lifecycle queue.
    fn apply_queued(self: &Arc<Self>, event: &AuthEvent) {
        let mut store = lock(&self.store);
        if self.pending_sign_outs.load(Ordering::SeqCst) > 0 {
            if event.kind == AuthChangeEvent::SignedOut {
                self.pending_sign_outs.fetch_sub(1, Ordering::SeqCst);
            } else if event.kind.carries_session() {
                tracing::debug!(kind = %event.kind, "dropping notification queued before local sign-out");
                return;
            }
        }
        self.commit(&mut store, event);
    }

    /// Apply one notification and publish the outcome.
    ///
    /// Callers hold the store lock while publishing and scheduling, so
    /// snapshots appear in the order transitions were committed.
    fn commit(self: &Arc<Self>, store: &mut IdentityStore, event: &AuthEvent) {
        let transition = store.apply(event);
        tracing::debug!(kind = %event.kind, ?transition, "lifecycle notification applied");

        match transition {
            Transition::Ignored => {}
            Transition::Authenticated {
                identity_changed,
                session_changed,
            } => {
                let (Some(identity), Some(session)) =
                    (store.identity().cloned(), store.session().cloned())
                else {
                    return;
                };
                let is_configured = self.auth.is_configured();
                let token = session.access_token.clone();

                if identity_changed {
                    self.state.send_replace(SessionSnapshot::authenticated(
                        identity.clone(),
                        Some(session),
                        is_configured,
                    ));
                } else {
                    self.state.send_modify(|snapshot| {
                        snapshot.phase = store.phase();
                        snapshot.session = Some(session);
                    });
                }

                if identity_changed || session_changed {
                    self.spawn_resolution(identity.id, token);
                }
            }
            Transition::Anonymous { .. } | Transition::SignedOut { .. } => {
                self.supersede_resolution();
                self.resolver.reset();
                if transition.clears_identity() {
                    self.invalidator.on_sign_out();
                }
                self.state
                    .send_replace(SessionSnapshot::anonymous(self.auth.is_configured()));
            }
        }
    }

    /// Resolve the profile for the (identity, token) pair just committed.
    fn spawn_resolution(self: &Arc<Self>, identity_id: String, token: String) {
        let generation = self.supersede_resolution();
        let resolver = Arc::clone(&self.resolver);
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let profile = resolver.resolve(Some(&identity_id), &token).await;
            if let Some(inner) = weak.upgrade() {
                inner.publish_profile(generation, &identity_id, profile);
            }
        });
        *lock(&self.resolution) = Some(handle);
    }

    /// Invalidate whatever resolution is in flight. Returns the new generation.
    fn supersede_resolution(&self) -> u64 {
        if let Some(previous) = lock(&self.resolution).take() {
            previous.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a finished resolution unless it has been superseded.
    fn publish_profile(&self, generation: u64, identity_id: &str, profile: Option<Profile>) {
        {
            let store = lock(&self.store);
            let current = self.alive.load(Ordering::SeqCst)
                && self.generation.load(Ordering::SeqCst) == generation
                && store.identity().is_some_and(|identity| identity.id == identity_id);
            if !current {
                tracing::debug!(identity_id, "discarding superseded profile resolution");
                return;
            }
            self.state.send_modify(|snapshot| {
                snapshot.profile.clone_from(&profile);
                snapshot.profile_resolved = true;
            });
        }
        self.invalidator.on_profile_resolved(profile.as_ref());
    }

    fn teardown(&self) {
        let was_alive = self.alive.swap(false, Ordering::SeqCst);
        if let Some(handle) = lock(&self.subscription).take() {
            handle.unsubscribe();
        }
        for task in lock(&self.tasks).drain(..) {
            task.abort();
        }
        self.supersede_resolution();
        if was_alive {
            tracing::debug!("session manager unmounted");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.teardown();
    }
}
