//! Insertion-ordered chat stream with optional self-expiry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::observe::{CollectionEvent, Listeners, SubscriptionId};
use crate::types::{BoardError, BoardResult, Chat, ChatId, DEFAULT_CHAT_TTL_MS};

struct ChatInner {
    items: Mutex<Vec<Arc<Chat>>>,
    ttl: Option<Duration>,
    listeners: Listeners<CollectionEvent<ChatId>>,
}

impl ChatInner {
    fn lock_items(&self) -> MutexGuard<'_, Vec<Arc<Chat>>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take(&self, id: ChatId) -> Option<Arc<Chat>> {
        let mut items = self.lock_items();
        let pos = items.iter().position(|c| c.id == id)?;
        Some(items.remove(pos))
    }
}

/// Chat messages in arrival order.
///
/// In expiring mode every `add` arms a one-shot tokio timer that removes
/// that exact message after the TTL. Removing a message early turns its
/// timer into a no-op; dropping the list does the same for all of them.
pub struct ChatList {
    inner: Arc<ChatInner>,
}

impl ChatList {
    fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(ChatInner {
                items: Mutex::new(Vec::new()),
                ttl,
                listeners: Listeners::new(),
            }),
        }
    }

    /// A list whose messages expire `ttl` after being added.
    pub fn expiring(ttl: Duration) -> Self {
        Self::with_ttl(Some(ttl))
    }

    /// A list that keeps every message until it is removed.
    pub fn accumulating() -> Self {
        Self::with_ttl(None)
    }

    /// Time-to-live, or `None` for an accumulating list.
    pub fn ttl(&self) -> Option<Duration> {
        self.inner.ttl
    }

    /// Append a message and, when expiring, schedule its removal.
    ///
    /// Expiring lists must be used from within a tokio runtime with the time
    /// driver enabled; otherwise `BoardError::NoRuntime` is returned and the
    /// message is not inserted.
    pub fn add(&self, chat: Chat) -> BoardResult<Arc<Chat>> {
        match self.inner.ttl {
            Some(ttl) => self.add_expiring_in(chat, ttl),
            None => Ok(self.insert(chat)),
        }
    }

    /// Append a message that expires after `delay` instead of the list TTL.
    /// Used when a message is restored with part of its lifetime used up.
    pub fn add_expiring_in(&self, chat: Chat, delay: Duration) -> BoardResult<Arc<Chat>> {
        let handle = Handle::try_current().map_err(|_| BoardError::NoRuntime)?;
        let id = chat.id;
        // Deadline is fixed now, not when the task is first polled.
        let deadline = Instant::now() + delay;
        let chat = self.insert(chat);

        let weak = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.take(id).is_some() {
                debug!("Chat {} expired", id);
                inner.listeners.emit(&CollectionEvent::Expired(id));
            }
        });
        Ok(chat)
    }

    fn insert(&self, chat: Chat) -> Arc<Chat> {
        let id = chat.id;
        let chat = Arc::new(chat);
        self.inner.lock_items().push(Arc::clone(&chat));
        self.inner.listeners.emit(&CollectionEvent::Added(id));
        chat
    }

    /// Remove a message now. Safe to call for absent or expired messages.
    pub fn remove(&self, id: ChatId) -> Option<Arc<Chat>> {
        let removed = self.inner.take(id)?;
        self.inner.listeners.emit(&CollectionEvent::Removed(id));
        Some(removed)
    }

    pub fn contains(&self, id: ChatId) -> bool {
        self.inner.lock_items().iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: ChatId) -> Option<Arc<Chat>> {
        self.inner
            .lock_items()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Messages in insertion order.
    pub fn to_vec(&self) -> Vec<Arc<Chat>> {
        self.inner.lock_items().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observe insertions, removals and expiries.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CollectionEvent<ChatId>) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

impl Default for ChatList {
    fn default() -> Self {
        Self::expiring(Duration::from_millis(DEFAULT_CHAT_TTL_MS))
    }
}

impl std::fmt::Debug for ChatList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatList")
            .field("ttl", &self.inner.ttl)
            .field("len", &self.len())
            .finish()
    }
}
