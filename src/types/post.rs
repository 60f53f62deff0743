//! Posts, their vote ledger, and the change notifications they emit.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    now_millis, BoardError, BoardResult, EventContext, PostId, Timestamp, UserId, Vote,
    DEFAULT_RECENT_VOTE_WINDOW_MS,
};
use crate::engine::score_votes;
use crate::observe::{Listeners, SubscriptionId};

/// Notification emitted by a post after a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum PostEvent {
    /// A vote was appended to the ledger. Ranked collections re-sort on this.
    Vote(Vote),
    /// A plain attribute changed (e.g. `"promoted_at"`, `"text"`).
    AttributeChanged(&'static str),
}

/// Plain-attribute form of a post, as carried over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSnapshot {
    #[serde(default)]
    pub id: PostId,
    #[serde(rename = "fromName")]
    pub author_name: String,
    #[serde(rename = "fromAffiliation")]
    pub author_affiliation: String,
    #[serde(rename = "fromId", default)]
    pub author_id: Option<UserId>,
    pub text: String,
    /// When the post was written (Unix epoch milliseconds).
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(rename = "promotedAt", default)]
    pub promoted_at: Option<Timestamp>,
}

/// A user-submitted post inside one event.
///
/// Shared as `Arc<Post>`. The ledger is append-only and changes only through
/// [`Post::add_vote`].
pub struct Post {
    id: PostId,
    state: RwLock<PostSnapshot>,
    event: RwLock<Weak<EventContext>>,
    listeners: Listeners<PostEvent>,
}

impl Post {
    fn from_parts(state: PostSnapshot, event: Weak<EventContext>) -> Self {
        Self {
            id: state.id,
            state: RwLock::new(state),
            event: RwLock::new(event),
            listeners: Listeners::new(),
        }
    }

    /// Build a post from its wire form, ledger included, without replaying
    /// dedup. Use `Event` rehydration for a checked rebuild.
    pub fn from_snapshot(snapshot: PostSnapshot) -> Self {
        Self::from_parts(snapshot, Weak::new())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, PostSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, PostSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn text(&self) -> String {
        self.read_state().text.clone()
    }

    pub fn author_name(&self) -> String {
        self.read_state().author_name.clone()
    }

    pub fn author_affiliation(&self) -> String {
        self.read_state().author_affiliation.clone()
    }

    pub fn author_id(&self) -> Option<UserId> {
        self.read_state().author_id.clone()
    }

    pub fn created_at(&self) -> Timestamp {
        self.read_state().created_at
    }

    /// Copy of the full plain-attribute state.
    pub fn snapshot(&self) -> PostSnapshot {
        self.read_state().clone()
    }

    // ==================== Event context ====================

    /// Point this post at an event's context. Only a weak reference is kept.
    pub fn attach(&self, context: &Arc<EventContext>) {
        *self.event.write().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(context);
    }

    /// The owning event's context, if the event is still alive.
    pub fn context(&self) -> Option<Arc<EventContext>> {
        self.event
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    // ==================== Vote ledger ====================

    /// Record a vote.
    ///
    /// `timestamp` defaults to now. Returns false, with no notification, when
    /// `voter` already voted on this post. Anonymous votes are deduplicated
    /// only if the event's vote policy forbids anonymous multi-voting.
    /// Unless `silent`, a [`PostEvent::Vote`] is delivered to subscribers
    /// before this returns.
    pub fn add_vote(&self, voter: Option<UserId>, timestamp: Option<Timestamp>, silent: bool) -> bool {
        let policy = self
            .context()
            .map(|c| c.vote_policy)
            .unwrap_or_default();
        let vote = Vote::new(voter, timestamp.unwrap_or_else(now_millis));

        {
            let mut state = self.write_state();
            let duplicate = match &vote.voter {
                Some(id) => ledger_has_vote_from(&state.votes, Some(id)),
                None => {
                    !policy.allow_anonymous_multi_vote && ledger_has_vote_from(&state.votes, None)
                }
            };
            if duplicate {
                debug!("Rejected duplicate vote on post {} from {:?}", self.id, vote.voter);
                return false;
            }
            state.votes.push(vote.clone());
        }

        if !silent {
            self.listeners.emit(&PostEvent::Vote(vote));
        }
        true
    }

    /// Number of votes in the ledger.
    pub fn vote_count(&self) -> usize {
        self.read_state().votes.len()
    }

    /// Copy of the ledger in recording order.
    pub fn votes(&self) -> Vec<Vote> {
        self.read_state().votes.clone()
    }

    /// Votes cast within the trailing window (default 2 minutes) before now.
    pub fn recent_votes(&self, window_ms: Option<u64>) -> usize {
        self.recent_votes_at(window_ms.unwrap_or(DEFAULT_RECENT_VOTE_WINDOW_MS), now_millis())
    }

    /// Votes with `now - timestamp < window_ms`.
    pub fn recent_votes_at(&self, window_ms: u64, now: Timestamp) -> usize {
        let window = i64::try_from(window_ms).unwrap_or(i64::MAX);
        self.read_state()
            .votes
            .iter()
            .filter(|v| now.saturating_sub(v.timestamp) < window)
            .count()
    }

    /// The vote with the latest timestamp. On ties the last recorded wins.
    pub fn most_recent_vote(&self) -> Option<Vote> {
        self.read_state()
            .votes
            .iter()
            .max_by_key(|v| v.timestamp)
            .cloned()
    }

    /// Whether `voter` has a vote here. `None` asks about anonymous votes.
    pub fn has_vote_from(&self, voter: Option<&UserId>) -> bool {
        ledger_has_vote_from(&self.read_state().votes, voter)
    }

    // ==================== Score ====================

    /// Time-adjusted score. Returns 0 and logs a warning when the post is
    /// not attached to a live event.
    pub fn score(&self) -> f64 {
        match self.try_score() {
            Ok(score) => score,
            Err(e) => {
                warn!("Post {}: {}. Returning 0.", self.id, e);
                0.0
            }
        }
    }

    /// Like [`Post::score`] but reports a missing event context as an error.
    pub fn try_score(&self) -> BoardResult<f64> {
        let context = self.context().ok_or(BoardError::MissingEventContext)?;
        Ok(score_votes(&self.read_state().votes, &context))
    }

    // ==================== Promotion ====================

    /// Mark the post as featured at `at` (default now). Rank is unaffected.
    pub fn promote(&self, at: Option<Timestamp>) {
        self.write_state().promoted_at = Some(at.unwrap_or_else(now_millis));
        self.listeners.emit(&PostEvent::AttributeChanged("promoted_at"));
    }

    pub fn is_promoted(&self) -> bool {
        self.read_state().promoted_at.is_some()
    }

    pub fn promoted_at(&self) -> Option<Timestamp> {
        self.read_state().promoted_at
    }

    // ==================== Observers ====================

    /// Register a handler for this post's notifications.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&PostEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    // ==================== Named attributes ====================

    /// Read an attribute by name as JSON. Unknown names yield `None`.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let state = self.read_state();
        let value = match name {
            "id" => json!(self.id),
            "author_name" => json!(state.author_name),
            "author_affiliation" => json!(state.author_affiliation),
            "author_id" => json!(state.author_id),
            "text" => json!(state.text),
            "created_at" => json!(state.created_at),
            "votes" => json!(state.votes),
            "promoted_at" => json!(state.promoted_at),
            _ => return None,
        };
        Some(value)
    }

    /// Set a mutable attribute by name and emit `AttributeChanged`.
    ///
    /// The ledger, id, author id and creation time cannot be set this way.
    /// `promoted_at` accepts an integer timestamp and cannot be cleared.
    pub fn set_attribute(&self, name: &str, value: Value) -> BoardResult<()> {
        let changed: &'static str = match name {
            "text" => {
                self.write_state().text = expect_string(name, &value)?;
                "text"
            }
            "author_name" => {
                self.write_state().author_name = expect_string(name, &value)?;
                "author_name"
            }
            "author_affiliation" => {
                self.write_state().author_affiliation = expect_string(name, &value)?;
                "author_affiliation"
            }
            "promoted_at" => {
                let at = value.as_i64().ok_or_else(|| BoardError::InvalidAttribute {
                    name: name.to_string(),
                    reason: "expected an integer timestamp; promotion cannot be cleared"
                        .to_string(),
                })?;
                self.write_state().promoted_at = Some(at);
                "promoted_at"
            }
            "id" | "votes" | "author_id" | "created_at" => {
                return Err(BoardError::ReadOnlyAttribute(name.to_string()))
            }
            _ => return Err(BoardError::UnknownAttribute(name.to_string())),
        };
        self.listeners.emit(&PostEvent::AttributeChanged(changed));
        Ok(())
    }
}

impl std::fmt::Debug for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Post")
            .field("id", &self.id)
            .field("state", &*self.read_state())
            .finish()
    }
}

fn ledger_has_vote_from(votes: &[Vote], voter: Option<&UserId>) -> bool {
    votes.iter().any(|v| v.voter.as_ref() == voter)
}

fn expect_string(name: &str, value: &Value) -> BoardResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BoardError::InvalidAttribute {
            name: name.to_string(),
            reason: "expected a string".to_string(),
        })
}

/// Builder for constructing Post instances ergonomically.
pub struct PostBuilder {
    id: Option<PostId>,
    text: String,
    author_name: String,
    author_affiliation: String,
    author_id: Option<UserId>,
    created_at: Option<Timestamp>,
    context: Option<Arc<EventContext>>,
}

impl PostBuilder {
    /// Create a new builder with the post text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            author_name: "default name".to_string(),
            author_affiliation: "nowhere".to_string(),
            author_id: None,
            created_at: None,
            context: None,
        }
    }

    pub fn id(mut self, id: PostId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set author name, affiliation and id in one go.
    pub fn author(
        mut self,
        name: impl Into<String>,
        affiliation: impl Into<String>,
        id: Option<UserId>,
    ) -> Self {
        self.author_name = name.into();
        self.author_affiliation = affiliation.into();
        self.author_id = id;
        self
    }

    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Attach the post to an event context up front.
    pub fn context(mut self, context: &Arc<EventContext>) -> Self {
        self.context = Some(Arc::clone(context));
        self
    }

    pub fn build(self) -> Post {
        let state = PostSnapshot {
            id: self.id.unwrap_or_default(),
            author_name: self.author_name,
            author_affiliation: self.author_affiliation,
            author_id: self.author_id,
            text: self.text,
            created_at: self.created_at.unwrap_or_else(now_millis),
            votes: Vec::new(),
            promoted_at: None,
        };
        let event = self.context.as_ref().map(Arc::downgrade).unwrap_or_default();
        Post::from_parts(state, event)
    }

    /// Build and wrap in an `Arc`, ready for a collection.
    pub fn build_shared(self) -> Arc<Post> {
        Arc::new(self.build())
    }
}

impl Default for PostBuilder {
    fn default() -> Self {
        Self::new("default text")
    }
}
