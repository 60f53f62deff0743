//! Users, only ever referenced by id from posts and votes.

use serde::{Deserialize, Serialize};

use super::{BoardError, BoardResult, UserId, MAX_USER_FIELD_LEN};

/// A participant in an event.
///
/// Construction does not validate; call [`User::validate`] explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub affiliation: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            affiliation: affiliation.into(),
        }
    }

    /// A user with the default name and affiliation.
    pub fn anonymous(id: impl Into<UserId>) -> Self {
        Self::new(id, "default name", "default affiliation")
    }

    /// The id to pass to `Post::add_vote`.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Check name and affiliation lengths. Returns a message fit for display.
    pub fn validate(&self) -> BoardResult<()> {
        if self.name.chars().count() > MAX_USER_FIELD_LEN {
            return Err(BoardError::Validation(format!(
                "'{}' is too long a name. It must be less than {} characters.",
                self.name, MAX_USER_FIELD_LEN
            )));
        }
        if self.affiliation.chars().count() > MAX_USER_FIELD_LEN {
            return Err(BoardError::Validation(format!(
                "'{}' is too long an affiliation. It must be less than {} characters.",
                self.affiliation, MAX_USER_FIELD_LEN
            )));
        }
        Ok(())
    }
}
