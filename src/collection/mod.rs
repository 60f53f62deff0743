//! Observable collections: the ranked post board and the chat stream.

pub mod chat_list;
pub mod ranked;

pub use chat_list::ChatList;
pub use ranked::RankedPosts;
