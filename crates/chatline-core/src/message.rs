// crates/chatline-core/src/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as stored in a channel's history. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub username: String,
    pub text: String,
    /// Server-assigned capture time of the append.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current wall-clock time.
    pub fn new(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
