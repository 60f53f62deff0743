//! The event: owner of the context, the ranked posts and the chat stream.

use std::sync::Arc;

use crate::collection::{ChatList, RankedPosts};
use crate::format::EventSnapshot;
use crate::types::{
    BoardError, BoardResult, Chat, EventContext, Post, PostId, Timestamp, UserId,
};

/// A timed event with its live post board and chat.
///
/// The event holds the only strong reference to its context; posts point
/// back to it weakly and score as 0 once the event is gone.
pub struct Event {
    title: String,
    context: Arc<EventContext>,
    posts: RankedPosts,
    chat: ChatList,
}

impl Event {
    /// Create an event with an empty board and a default expiring chat list.
    pub fn new(title: impl Into<String>, context: EventContext) -> Self {
        Self {
            title: title.into(),
            context: Arc::new(context),
            posts: RankedPosts::new(),
            chat: ChatList::default(),
        }
    }

    /// Replace the chat list, e.g. with a different TTL or an accumulating one.
    pub fn with_chat(mut self, chat: ChatList) -> Self {
        self.chat = chat;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn context(&self) -> &Arc<EventContext> {
        &self.context
    }

    pub fn posts(&self) -> &RankedPosts {
        &self.posts
    }

    pub fn chat(&self) -> &ChatList {
        &self.chat
    }

    /// Attach `post` to this event and insert it into the ranking.
    pub fn add_post(&self, post: Post) -> Arc<Post> {
        let post = Arc::new(post);
        self.add_shared_post(Arc::clone(&post));
        post
    }

    /// Like `add_post` for a post that is already shared. Returns false if
    /// it was already on the board.
    pub fn add_shared_post(&self, post: Arc<Post>) -> bool {
        post.attach(&self.context);
        self.posts.add(post)
    }

    pub fn post(&self, id: PostId) -> Option<Arc<Post>> {
        self.posts.get(id)
    }

    pub fn add_chat(&self, chat: Chat) -> BoardResult<Arc<Chat>> {
        self.chat.add(chat)
    }

    /// Vote on a post by id. `Ok(false)` means the vote was a duplicate.
    pub fn vote(
        &self,
        post_id: PostId,
        voter: Option<UserId>,
        timestamp: Option<Timestamp>,
    ) -> BoardResult<bool> {
        let post = self.post(post_id).ok_or(BoardError::PostNotFound(post_id))?;
        Ok(post.add_vote(voter, timestamp, false))
    }

    /// Promote a post by id.
    pub fn promote(&self, post_id: PostId, at: Option<Timestamp>) -> BoardResult<()> {
        let post = self.post(post_id).ok_or(BoardError::PostNotFound(post_id))?;
        post.promote(at);
        Ok(())
    }

    /// Plain snapshot: posts in rank order, chat in arrival order.
    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot {
            title: self.title.clone(),
            start: self.context.start,
            vote_decay_rate: self.context.vote_decay_rate,
            posts: self.posts.to_vec().iter().map(|p| p.snapshot()).collect(),
            chat: self.chat.to_vec().iter().map(|c| (**c).clone()).collect(),
        }
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("title", &self.title)
            .field("context", &self.context)
            .field("posts", &self.posts)
            .field("chat", &self.chat)
            .finish()
    }
}
