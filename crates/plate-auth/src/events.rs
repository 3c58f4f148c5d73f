//! Lifecycle notification hub.
//!
//! Each subscriber gets its own unbounded, ordered queue. `emit` fans an event
//! out to every live subscriber while holding the hub lock, so all subscribers
//! observe notifications in the same order. Unsubscribing is explicit
//! ([`UnsubscribeHandle::unsubscribe`]) or happens when the [`Subscription`]
//! is dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use plate_core::AuthEvent;
use tokio::sync::mpsc;

use crate::lock;

#[derive(Default)]
struct Hub {
    next_id: u64,
    subscribers: BTreeMap<u64, mpsc::UnboundedSender<AuthEvent>>,
}

/// Fan-out point for auth lifecycle notifications.
#[derive(Clone, Default)]
pub struct AuthEvents {
    hub: Arc<Mutex<Hub>>,
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber that receives every event emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.register(None)
    }

    /// Register a subscriber whose queue starts with `initial`.
    ///
    /// The initial event is queued under the hub lock, so no concurrently
    /// emitted event can overtake it.
    #[must_use]
    pub fn subscribe_with(&self, initial: AuthEvent) -> Subscription {
        self.register(Some(initial))
    }

    fn register(&self, initial: Option<AuthEvent>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut hub = lock(&self.hub);
        let id = hub.next_id;
        hub.next_id += 1;
        if let Some(event) = initial {
            // Receiver is alive: it is returned below.
            let _ = tx.send(event);
        }
        hub.subscribers.insert(id, tx);
        tracing::trace!(subscriber = id, "auth events: subscribed");
        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.hub),
        }
    }

    /// Deliver `event` to every live subscriber. Returns how many received it.
    pub fn emit(&self, event: &AuthEvent) -> usize {
        let mut hub = lock(&self.hub);
        hub.subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
        tracing::debug!(
            kind = %event.kind,
            subscribers = hub.subscribers.len(),
            "auth events: emitted"
        );
        hub.subscribers.len()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.hub).subscribers.len()
    }
}

/// A registered listener. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<AuthEvent>,
    hub: Weak<Mutex<Hub>>,
}

impl Subscription {
    /// Next notification, or `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.rx.recv().await
    }

    /// Next queued notification without waiting.
    pub fn try_recv(&mut self) -> Option<AuthEvent> {
        self.rx.try_recv().ok()
    }

    /// Cloneable handle that can cancel this subscription from elsewhere.
    #[must_use]
    pub fn handle(&self) -> UnsubscribeHandle {
        UnsubscribeHandle {
            id: self.id,
            hub: self.hub.clone(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle().unsubscribe();
    }
}

/// Cancels a [`Subscription`] without owning it.
#[derive(Clone)]
pub struct UnsubscribeHandle {
    id: u64,
    hub: Weak<Mutex<Hub>>,
}

impl UnsubscribeHandle {
    /// Remove the subscriber. Returns `false` if it was already gone.
    ///
    /// Events already queued stay readable; the subscription's `recv`
    /// returns `None` after them.
    pub fn unsubscribe(&self) -> bool {
        let Some(hub) = self.hub.upgrade() else {
            return false;
        };
        let removed = lock(&hub).subscribers.remove(&self.id).is_some();
        if removed {
            tracing::trace!(subscriber = self.id, "auth events: unsubscribed");
        }
        removed
    }
}
