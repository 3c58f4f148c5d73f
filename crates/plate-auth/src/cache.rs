//! Shared query cache and the invalidator that keeps it consistent with
//! profile changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use plate_core::Profile;

use crate::lock;

/// The commands the session layer issues to the shared query cache.
///
/// The cache is owned by the application; the session layer never writes
/// entries, it only invalidates or clears them.
pub trait QueryCache: Send + Sync {
    /// Mark every entry stale without removing it.
    fn invalidate_all(&self);

    /// Remove every entry.
    fn clear(&self);
}

/// A cached read.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub stale: bool,
    pub fetched_at: DateTime<Utc>,
}

/// In-process keyed query cache.
#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryQueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a fresh entry.
    pub fn put(&self, key: impl Into<String>, value: serde_json::Value) {
        lock(&self.entries).insert(
            key.into(),
            CacheEntry {
                value,
                stale: false,
                fetched_at: Utc::now(),
            },
        );
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        lock(&self.entries).get(key).cloned()
    }

    /// Cached value only if it is still fresh.
    #[must_use]
    pub fn get_fresh(&self, key: &str) -> Option<serde_json::Value> {
        lock(&self.entries)
            .get(key)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.value.clone())
    }

    #[must_use]
    pub fn is_stale(&self, key: &str) -> Option<bool> {
        lock(&self.entries).get(key).map(|entry| entry.stale)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl QueryCache for MemoryQueryCache {
    fn invalidate_all(&self) {
        let mut entries = lock(&self.entries);
        for entry in entries.values_mut() {
            entry.stale = true;
        }
        tracing::debug!(entries = entries.len(), "query cache invalidated");
    }

    fn clear(&self) {
        let mut entries = lock(&self.entries);
        let removed = entries.len();
        entries.clear();
        tracing::debug!(removed, "query cache cleared");
    }
}

/// Turns profile changes and sign-outs into cache commands.
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: Arc<dyn QueryCache>,
}

impl CacheInvalidator {
    #[must_use]
    pub fn new(cache: Arc<dyn QueryCache>) -> Self {
        Self { cache }
    }

    /// A resolution completed: everything derived from the previous profile
    /// is stale, whether or not a profile was found.
    pub fn on_profile_resolved(&self, profile: Option<&Profile>) {
        tracing::debug!(
            user_id = profile.map(Profile::user_id),
            "profile resolved; invalidating query cache"
        );
        self.cache.invalidate_all();
    }

    /// Signed out: nothing authenticated may survive into the next render.
    pub fn on_sign_out(&self) {
        tracing::debug!("signed out; clearing query cache");
        self.cache.clear();
    }
}
