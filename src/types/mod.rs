//! All data types for the rankboard library.

pub mod chat;
pub mod context;
pub mod error;
pub mod ids;
pub mod post;
pub mod user;
pub mod vote;

pub use chat::{Chat, ChatBuilder};
pub use context::{EventContext, VotePolicy};
pub use error::{BoardError, BoardResult};
pub use ids::{ChatId, PostId, UserId};
pub use post::{Post, PostBuilder, PostEvent, PostSnapshot};
pub use user::User;
pub use vote::Vote;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// Points contributed per vote per millisecond of age past the event start.
pub const DEFAULT_VOTE_DECAY_RATE: f64 = 0.000_001;

/// How long a chat message stays in an expiring list: 10 seconds.
pub const DEFAULT_CHAT_TTL_MS: u64 = 10_000;

/// Trailing window used by `Post::recent_votes`: 2 minutes.
pub const DEFAULT_RECENT_VOTE_WINDOW_MS: u64 = 120_000;

/// Maximum length of a user's name or affiliation, in characters.
pub const MAX_USER_FIELD_LEN: usize = 30;

/// Returns the current time as Unix epoch milliseconds.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
