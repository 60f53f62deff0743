//! Board configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collection::ChatList;
use crate::types::{
    BoardError, BoardResult, EventContext, Timestamp, VotePolicy, DEFAULT_CHAT_TTL_MS,
    DEFAULT_RECENT_VOTE_WINDOW_MS, DEFAULT_VOTE_DECAY_RATE,
};

/// Tunables for scoring and chat expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Points per vote per millisecond past the event start.
    #[serde(default = "default_vote_decay_rate")]
    pub vote_decay_rate: f64,
    /// Chat time-to-live in milliseconds for lists built by `chat_list`.
    /// 0 keeps chat forever. The CLI carries stored chat through unchanged.
    #[serde(default = "default_chat_ttl_ms")]
    pub chat_ttl_ms: u64,
    /// Trailing window for "recent votes" reporting.
    #[serde(default = "default_recent_vote_window_ms")]
    pub recent_vote_window_ms: u64,
    /// Whether votes without a voter id bypass dedup.
    #[serde(default = "default_allow_anonymous_multi_vote")]
    pub allow_anonymous_multi_vote: bool,
    /// Log level used by the CLI when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_vote_decay_rate() -> f64 {
    DEFAULT_VOTE_DECAY_RATE
}

fn default_chat_ttl_ms() -> u64 {
    DEFAULT_CHAT_TTL_MS
}

fn default_recent_vote_window_ms() -> u64 {
    DEFAULT_RECENT_VOTE_WINDOW_MS
}

fn default_allow_anonymous_multi_vote() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            vote_decay_rate: default_vote_decay_rate(),
            chat_ttl_ms: default_chat_ttl_ms(),
            recent_vote_window_ms: default_recent_vote_window_ms(),
            allow_anonymous_multi_vote: default_allow_anonymous_multi_vote(),
            log_level: default_log_level(),
        }
    }
}

impl BoardConfig {
    pub fn from_toml_str(content: &str) -> BoardResult<Self> {
        toml::from_str(content).map_err(|e| BoardError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn vote_policy(&self) -> VotePolicy {
        VotePolicy {
            allow_anonymous_multi_vote: self.allow_anonymous_multi_vote,
        }
    }

    /// Context for an event starting at `start`.
    pub fn event_context(&self, start: Timestamp) -> EventContext {
        EventContext::new(start, self.vote_decay_rate).with_vote_policy(self.vote_policy())
    }

    /// A fresh chat list honoring `chat_ttl_ms`.
    pub fn chat_list(&self) -> ChatList {
        match self.chat_ttl_ms {
            0 => ChatList::accumulating(),
            ms => ChatList::expiring(Duration::from_millis(ms)),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> BoardResult<BoardConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BoardError::Io(std::io::Error::other(format!(
            "Failed to read config file {}: {e}",
            path.display()
        )))
    })?;
    BoardConfig::from_toml_str(&content)
}
