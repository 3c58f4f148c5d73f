//! # plate-auth
//!
//! Client-side session synchronization for the Plate apps.
//!
//! Keeps three things consistent with the hosted auth service: who is signed
//! in ([`IdentityStore`]), which profile belongs to them ([`ProfileResolver`]),
//! and which cached query data may still be served ([`CacheInvalidator`]).
//! [`SessionManager`] wires them to an [`AuthBackend`] and publishes a
//! [`plate_core::SessionSnapshot`] on every change.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod backend;
pub mod cache;
pub mod error;
pub mod events;
pub mod hosted;
pub mod manager;
pub mod memo;
pub mod profile_source;
pub mod refresh;
pub mod resolver;
pub mod rest;
pub mod session_store;
pub mod store;

pub use backend::{AuthBackend, SignUpOutcome, UnconfiguredAuth};
pub use cache::{CacheInvalidator, MemoryQueryCache, QueryCache};
pub use error::{AuthError, LookupError};
pub use events::{AuthEvents, Subscription, UnsubscribeHandle};
pub use hosted::HostedAuth;
pub use manager::{SessionManager, SessionOptions};
pub use profile_source::{ProfileSource, RestProfileSource, SignUpDetails};
pub use resolver::ProfileResolver;
pub use rest::RestClient;
pub use session_store::SessionStore;
pub use store::{IdentityStore, Transition};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Every critical section in this crate leaves its data consistent before
/// any point that can panic.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
