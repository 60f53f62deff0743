//! Score-ordered post collection that re-sorts itself on votes.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;

use crate::observe::{CollectionEvent, Listeners, SubscriptionId};
use crate::types::{Post, PostEvent, PostId};

struct Member {
    post: Arc<Post>,
    /// Our vote listener on `post`, released on removal.
    subscription: SubscriptionId,
}

struct RankedInner {
    /// Sorted by descending score, ties in prior relative order.
    members: RwLock<Vec<Member>>,
    listeners: Listeners<CollectionEvent<PostId>>,
}

impl RankedInner {
    fn read_members(&self) -> RwLockReadGuard<'_, Vec<Member>> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_members(&self) -> RwLockWriteGuard<'_, Vec<Member>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Full stable re-sort by descending score.
    fn resort(&self) {
        {
            let mut members = self.write_members();
            let mut keyed: Vec<(f64, Member)> = members
                .drain(..)
                .map(|m| (m.post.score(), m))
                .collect();
            keyed.sort_by(|a, b| descending(a.0, b.0));
            members.extend(keyed.into_iter().map(|(_, m)| m));
        }
        self.listeners.emit(&CollectionEvent::Sorted);
    }
}

impl Drop for RankedInner {
    fn drop(&mut self) {
        let members = self.members.get_mut().unwrap_or_else(PoisonError::into_inner);
        for member in members.iter() {
            member.post.unsubscribe(member.subscription);
        }
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Posts ordered by descending score.
///
/// Each member is observed: a non-silent vote on any member triggers a full
/// stable re-sort before `Post::add_vote` returns. Silent votes leave the
/// order alone until the next re-sort.
pub struct RankedPosts {
    inner: Arc<RankedInner>,
}

impl RankedPosts {
    /// Create a new, empty collection.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RankedInner {
                members: RwLock::new(Vec::new()),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Insert `post` at its sorted position and start watching its votes.
    ///
    /// Equal scores keep insertion order: the new post lands after every
    /// member with a score greater than or equal to its own. Returns false if
    /// the post is already a member.
    ///
    /// The position is only exact when the list is sorted. After silent votes
    /// on members, call `resort` first (or afterwards) to restore the order.
    pub fn add(&self, post: Arc<Post>) -> bool {
        if self.contains(post.id()) {
            return false;
        }

        let weak = Arc::downgrade(&self.inner);
        let subscription = post.subscribe(move |event| {
            if let PostEvent::Vote(_) = event {
                if let Some(inner) = weak.upgrade() {
                    inner.resort();
                }
            }
        });

        let id = post.id();
        let score = post.score();
        {
            let mut members = self.inner.write_members();
            let pos = members.partition_point(|m| m.post.score() >= score);
            members.insert(pos, Member { post, subscription });
            debug!("Added post {} at rank {}", id, pos);
        }
        self.inner.listeners.emit(&CollectionEvent::Added(id));
        true
    }

    /// Remove a member and release its vote subscription.
    pub fn remove(&self, id: PostId) -> Option<Arc<Post>> {
        let removed = {
            let mut members = self.inner.write_members();
            let pos = members.iter().position(|m| m.post.id() == id)?;
            members.remove(pos)
        };
        removed.post.unsubscribe(removed.subscription);
        self.inner.listeners.emit(&CollectionEvent::Removed(id));
        Some(removed.post)
    }

    /// Zero-based position of `id`, or `None` if it is not a member.
    pub fn rank_of(&self, id: PostId) -> Option<usize> {
        self.inner.read_members().iter().position(|m| m.post.id() == id)
    }

    /// Members with a promotion timestamp, in collection order.
    pub fn promoted_posts(&self) -> Vec<Arc<Post>> {
        self.inner
            .read_members()
            .iter()
            .filter(|m| m.post.is_promoted())
            .map(|m| Arc::clone(&m.post))
            .collect()
    }

    pub fn get(&self, id: PostId) -> Option<Arc<Post>> {
        self.inner
            .read_members()
            .iter()
            .find(|m| m.post.id() == id)
            .map(|m| Arc::clone(&m.post))
    }

    pub fn contains(&self, id: PostId) -> bool {
        self.rank_of(id).is_some()
    }

    /// Members in rank order.
    pub fn to_vec(&self) -> Vec<Arc<Post>> {
        self.inner
            .read_members()
            .iter()
            .map(|m| Arc::clone(&m.post))
            .collect()
    }

    /// Member ids in rank order.
    pub fn ids(&self) -> Vec<PostId> {
        self.inner.read_members().iter().map(|m| m.post.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read_members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-sort now. Needed only after silent votes.
    pub fn resort(&self) {
        self.inner.resort();
    }

    /// Observe membership and order changes.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CollectionEvent<PostId>) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

impl Default for RankedPosts {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RankedPosts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankedPosts")
            .field("ids", &self.ids())
            .finish()
    }
}
