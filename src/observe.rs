//! Change notification plumbing shared by posts and collections.
//!
//! Handlers are called synchronously, in registration order, on the thread
//! that caused the change. The handler list lock is released before any
//! handler runs, so a handler may subscribe, unsubscribe or mutate the
//! emitter again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback type for change notifications.
pub type ChangeHandler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Membership or order change on an observable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEvent<Id> {
    /// A member was inserted.
    Added(Id),
    /// A member was removed by a caller.
    Removed(Id),
    /// A member was removed by its expiry timer.
    Expired(Id),
    /// The collection reordered itself.
    Sorted,
}

/// Ordered list of subscribed handlers for one event type.
pub struct Listeners<E> {
    handlers: RwLock<Vec<(SubscriptionId, ChangeHandler<E>)>>,
    next_id: AtomicU64,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler. It stays registered until `unsubscribe`.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    /// Deliver an event to every handler registered at the time of the call.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<ChangeHandler<E>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}
