//! Rankboard: live vote-ranked posts and self-expiring chat for timed events.
//!
//! Posts collect votes; each vote is worth slightly more the later it lands
//! after the event start. The board keeps its posts sorted by that score and
//! re-sorts on every vote. Chat messages remove themselves after a fixed TTL.

pub mod board;
#[cfg(feature = "cli")]
pub mod cli;
pub mod collection;
pub mod config;
pub mod engine;
pub mod format;
pub mod observe;
pub mod types;

// Re-export commonly used types at the crate root
pub use board::{Event, RehydrateMode, Rehydrator};
pub use collection::{ChatList, RankedPosts};
pub use config::{load_config, BoardConfig};
pub use engine::{score_votes, vote_weight};
pub use format::EventSnapshot;
pub use observe::{ChangeHandler, CollectionEvent, Listeners, SubscriptionId};
pub use types::{
    now_millis, BoardError, BoardResult, Chat, ChatBuilder, ChatId, EventContext, Post,
    PostBuilder, PostEvent, PostId, PostSnapshot, Timestamp, User, UserId, Vote, VotePolicy,
    DEFAULT_CHAT_TTL_MS, DEFAULT_RECENT_VOTE_WINDOW_MS, DEFAULT_VOTE_DECAY_RATE,
    MAX_USER_FIELD_LEN,
};
