//! Turning an `EventSnapshot` back into a live `Event`.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::Event;
use crate::collection::ChatList;
use crate::format::EventSnapshot;
use crate::types::{
    now_millis, BoardResult, Chat, EventContext, Post, PostSnapshot, Timestamp, VotePolicy,
};

/// What to do with the post and chat arrays of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RehydrateMode {
    /// Keep title and context, start with empty collections.
    #[default]
    Discard,
    /// Rebuild every post (replaying its votes) and every live chat message.
    Rebuild,
}

/// Configurable snapshot-to-event conversion.
pub struct Rehydrator {
    mode: RehydrateMode,
    chat: Option<ChatList>,
    vote_policy: VotePolicy,
    now: Option<Timestamp>,
}

impl Rehydrator {
    pub fn new(mode: RehydrateMode) -> Self {
        Self {
            mode,
            chat: None,
            vote_policy: VotePolicy::default(),
            now: None,
        }
    }

    /// Chat list to fill. Defaults to an expiring list with the default TTL.
    pub fn chat_list(mut self, chat: ChatList) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn vote_policy(mut self, policy: VotePolicy) -> Self {
        self.vote_policy = policy;
        self
    }

    /// Reference time for computing how much TTL restored chat has left.
    pub fn now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    pub fn rehydrate(self, snapshot: EventSnapshot) -> BoardResult<Event> {
        let context = EventContext::new(snapshot.start, snapshot.vote_decay_rate)
            .with_vote_policy(self.vote_policy);
        let chat = self.chat.unwrap_or_default();
        let event = Event::new(snapshot.title, context).with_chat(chat);

        match self.mode {
            RehydrateMode::Discard => {
                debug!(
                    "Discarding {} posts and {} chat messages from snapshot",
                    snapshot.posts.len(),
                    snapshot.chat.len()
                );
            }
            RehydrateMode::Rebuild => {
                let now = self.now.unwrap_or_else(now_millis);
                rebuild_posts(&event, snapshot.posts);
                rebuild_chat(&event, snapshot.chat, now)?;
            }
        }
        Ok(event)
    }
}

fn rebuild_posts(event: &Event, posts: Vec<PostSnapshot>) {
    for mut snapshot in posts {
        let votes = std::mem::take(&mut snapshot.votes);
        let promoted_at = snapshot.promoted_at.take();
        let post = Post::from_snapshot(snapshot);
        post.attach(event.context());

        let mut rejected = 0usize;
        for vote in votes {
            if !post.add_vote(vote.voter, Some(vote.timestamp), true) {
                rejected += 1;
            }
        }
        if rejected > 0 {
            warn!("Post {}: dropped {} duplicate votes while rebuilding", post.id(), rejected);
        }
        if let Some(at) = promoted_at {
            post.promote(Some(at));
        }

        let id = post.id();
        if !event.add_shared_post(Arc::new(post)) {
            warn!("Snapshot lists post {} more than once; keeping the first", id);
        }
    }
}

fn rebuild_chat(event: &Event, chats: Vec<Chat>, now: Timestamp) -> BoardResult<()> {
    let list = event.chat();
    let Some(ttl) = list.ttl() else {
        for chat in chats {
            list.add(chat)?;
        }
        return Ok(());
    };

    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    for chat in chats {
        let age = now.saturating_sub(chat.created_at).max(0);
        let remaining = ttl_ms.saturating_sub(age);
        if remaining <= 0 {
            debug!("Chat {} already expired; not restoring", chat.id);
            continue;
        }
        list.add_expiring_in(chat, Duration::from_millis(remaining as u64))?;
    }
    Ok(())
}

impl Event {
    /// Rehydrate with default chat TTL and vote policy.
    pub fn from_snapshot(snapshot: EventSnapshot, mode: RehydrateMode) -> BoardResult<Event> {
        Rehydrator::new(mode).rehydrate(snapshot)
    }
}
