//! Profile resolver: maps (identity id, access token) to a profile.
//!
//! Resolution never fails from the caller's point of view: any lookup
//! failure degrades to "no profile" and is only logged. Outcomes are kept in
//! a one-entry memo keyed by identity id.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use plate_core::Profile;

use crate::error::LookupError;
use crate::lock;
use crate::memo::SingleSlot;
use crate::profile_source::ProfileSource;

pub struct ProfileResolver {
    source: Arc<dyn ProfileSource>,
    memo: Mutex<SingleSlot<String, Option<Profile>>>,
    settle_delay: Duration,
}

impl ProfileResolver {
    #[must_use]
    pub fn new(source: Arc<dyn ProfileSource>, settle_delay: Duration) -> Self {
        Self {
            source,
            memo: Mutex::new(SingleSlot::new()),
            settle_delay,
        }
    }

    #[must_use]
    pub fn source(&self) -> &Arc<dyn ProfileSource> {
        &self.source
    }

    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Resolve the profile of `identity_id`.
    ///
    /// A memo hit returns immediately. On a miss the resolver waits the
    /// settling delay, then looks the profile up with `access_token`.
    /// `None` as identity resets the memo and resolves to `None`.
    pub async fn resolve(&self, identity_id: Option<&str>, access_token: &str) -> Option<Profile> {
        let Some(identity_id) = identity_id else {
            self.reset();
            return None;
        };

        if let Some(hit) = self.observe(identity_id) {
            tracing::trace!(identity_id, "profile memo hit");
            return hit;
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        self.lookup_and_store(identity_id, access_token).await
    }

    /// Drop the memoized outcome and look the profile up again right away.
    pub async fn refresh(&self, identity_id: &str, access_token: &str) -> Option<Profile> {
        self.observe(identity_id);
        self.invalidate();
        self.lookup_and_store(identity_id, access_token).await
    }

    /// Forget the memoized outcome for the current identity.
    pub fn invalidate(&self) {
        lock(&self.memo).invalidate();
    }

    /// Forget the current identity entirely.
    pub fn reset(&self) {
        lock(&self.memo).reset();
    }

    fn observe(&self, identity_id: &str) -> Option<Option<Profile>> {
        lock(&self.memo).observe(Some(&identity_id.to_string()))
    }

    async fn lookup_and_store(&self, identity_id: &str, access_token: &str) -> Option<Profile> {
        let outcome = match self.source.lookup(identity_id, access_token).await {
            Ok(profile) if profile.user_id() == identity_id => Some(profile),
            Ok(profile) => {
                tracing::warn!(
                    identity_id,
                    profile_user_id = profile.user_id(),
                    "profile lookup returned a row for another identity; ignoring it"
                );
                None
            }
            Err(LookupError::NotFound) => {
                tracing::debug!(identity_id, "no profile row for identity");
                None
            }
            Err(error) => {
                tracing::warn!(identity_id, %error, "profile lookup failed");
                None
            }
        };

        let stored = lock(&self.memo).store(&identity_id.to_string(), outcome.clone());
        if !stored {
            tracing::debug!(identity_id, "identity changed during lookup; outcome not memoized");
        }
        outcome
    }
}
