//! A single recorded vote.

use serde::{Deserialize, Serialize};

use super::{Timestamp, UserId};

/// One entry in a post's ledger. `voter` is `None` for anonymous votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Who voted, if known.
    #[serde(rename = "id")]
    pub voter: Option<UserId>,
    /// When the vote was cast (Unix epoch milliseconds).
    pub timestamp: Timestamp,
}

impl Vote {
    pub fn new(voter: Option<UserId>, timestamp: Timestamp) -> Self {
        Self { voter, timestamp }
    }

    pub fn is_anonymous(&self) -> bool {
        self.voter.is_none()
    }
}
