// crates/chatline-store/src/log.rs
//
// Append-only per-channel message history.
//
// Messages are kept in receive order per channel id; nothing is reordered or
// deduplicated. Channel existence is not validated here, callers decide.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use chatline_core::error::ChatError;
use chatline_core::message::Message;

/// Channel id -> messages, oldest first.
#[derive(Debug, Default)]
pub struct MessageLog {
    channels: HashMap<String, Vec<Message>>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a channel and return its server-assigned timestamp.
    pub fn append(&mut self, channel_id: &str, username: &str, text: &str) -> DateTime<Utc> {
        let message = Message::new(username, text);
        let timestamp = message.timestamp;
        self.channels
            .entry(channel_id.to_string())
            .or_default()
            .push(message);
        timestamp
    }

    /// Copy of a channel's history, oldest first. Does not drain the log.
    ///
    /// Fails with `NotFound` if nothing was ever appended to the channel.
    pub fn replay(&self, channel_id: &str) -> Result<Vec<Message>, ChatError> {
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| ChatError::NotFound(format!("channel {} not found", channel_id)))
    }
}

#[cfg(test)]
impl MessageLog {
    pub(crate) fn len(&self, channel_id: &str) -> usize {
        self.channels.get(channel_id).map_or(0, Vec::len)
    }

    pub(crate) fn is_empty(&self, channel_id: &str) -> bool {
        self.len(channel_id) == 0
    }
}
