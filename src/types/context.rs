//! Event context: the read-only inputs to scoring.

use serde::{Deserialize, Serialize};

use super::{now_millis, Timestamp, DEFAULT_VOTE_DECAY_RATE};

/// Rules applied when a post records a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePolicy {
    /// When true, votes without a voter id are never deduplicated.
    pub allow_anonymous_multi_vote: bool,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            allow_anonymous_multi_vote: true,
        }
    }
}

/// Time origin and decay constant shared by every post of one event.
///
/// Posts hold a `Weak` reference to this; the owning `Event` holds the `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// Event start (Unix epoch milliseconds).
    pub start: Timestamp,
    /// Points per vote per millisecond between the event start and the vote.
    pub vote_decay_rate: f64,
    #[serde(default)]
    pub vote_policy: VotePolicy,
}

impl EventContext {
    pub fn new(start: Timestamp, vote_decay_rate: f64) -> Self {
        Self {
            start,
            vote_decay_rate,
            vote_policy: VotePolicy::default(),
        }
    }

    pub fn with_vote_policy(mut self, policy: VotePolicy) -> Self {
        self.vote_policy = policy;
        self
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::new(now_millis(), DEFAULT_VOTE_DECAY_RATE)
    }
}
