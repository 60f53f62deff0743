//! Plain snapshot of an event, as exchanged with the transport layer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{BoardResult, Chat, PostSnapshot, Timestamp, DEFAULT_VOTE_DECAY_RATE};

fn default_title() -> String {
    "Default Event Title".to_string()
}

fn default_vote_decay_rate() -> f64 {
    DEFAULT_VOTE_DECAY_RATE
}

/// Wire form of an event. Collections are bare arrays here; turning them
/// back into live collections is the job of `Rehydrator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    #[serde(default = "default_title")]
    pub title: String,
    /// Event start (Unix epoch milliseconds).
    pub start: Timestamp,
    #[serde(rename = "voteTimeScoreFactor", default = "default_vote_decay_rate")]
    pub vote_decay_rate: f64,
    /// Posts in rank order at the time of the snapshot.
    #[serde(default)]
    pub posts: Vec<PostSnapshot>,
    /// Chat messages in arrival order.
    #[serde(default)]
    pub chat: Vec<Chat>,
}

impl EventSnapshot {
    /// An event with no posts or chat.
    pub fn empty(title: impl Into<String>, start: Timestamp) -> Self {
        Self {
            title: title.into(),
            start,
            vote_decay_rate: DEFAULT_VOTE_DECAY_RATE,
            posts: Vec::new(),
            chat: Vec::new(),
        }
    }

    pub fn from_json(s: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a snapshot from a JSON file.
    pub fn read_from_file(path: &Path) -> BoardResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Write a snapshot to a JSON file, replacing it.
    pub fn write_to_file(&self, path: &Path) -> BoardResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
