//! Chat messages and their builder.

use serde::{Deserialize, Serialize};

use super::{now_millis, ChatId, Timestamp, UserId};

/// An immutable chat message. Field names on the wire follow the snapshot
/// format shared with posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub id: ChatId,
    #[serde(rename = "fromName")]
    pub author_name: String,
    #[serde(rename = "fromAffiliation")]
    pub author_affiliation: String,
    #[serde(rename = "fromId", default)]
    pub author_id: Option<UserId>,
    pub text: String,
    /// When the message was written (Unix epoch milliseconds).
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
    #[serde(rename = "admin", default)]
    pub is_admin: bool,
}

/// Builder for constructing Chat instances ergonomically.
pub struct ChatBuilder {
    id: Option<ChatId>,
    text: String,
    author_name: String,
    author_affiliation: String,
    author_id: Option<UserId>,
    created_at: Option<Timestamp>,
    is_admin: bool,
}

impl ChatBuilder {
    /// Create a new builder with the message text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            author_name: "default".to_string(),
            author_affiliation: "default affiliation".to_string(),
            author_id: None,
            created_at: None,
            is_admin: false,
        }
    }

    pub fn id(mut self, id: ChatId) -> Self {
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

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn build(self) -> Chat {
        Chat {
            id: self.id.unwrap_or_default(),
            author_name: self.author_name,
            author_affiliation: self.author_affiliation,
            author_id: self.author_id,
            text: self.text,
            created_at: self.created_at.unwrap_or_else(now_millis),
            is_admin: self.is_admin,
        }
    }
}

impl Default for ChatBuilder {
    fn default() -> Self {
        Self::new("default message")
    }
}
