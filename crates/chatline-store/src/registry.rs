// crates/chatline-store/src/registry.rs
//
// Room and channel registry.
//
// Layout:
//   - rooms:    room_id -> ChatRoom
//   - channels: room_id -> (channel_id -> Channel)
//
// Rooms are never deleted, so a channel's room reference stays valid once
// it has been checked at creation time. Join/leave are informational only:
// no membership list is kept.

use std::collections::HashMap;

use chatline_core::crypto::new_entity_id;
use chatline_core::error::ChatError;
use chatline_core::room::{Channel, ChatRoom};

/// Owner of all room and channel metadata.
#[derive(Debug, Default)]
pub struct Registry {
    rooms: HashMap<String, ChatRoom>,
    channels: HashMap<String, HashMap<String, Channel>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room with a fresh id and return the id.
    pub fn create_room(&mut self, name: &str) -> String {
        let id = new_entity_id();
        self.rooms.insert(
            id.clone(),
            ChatRoom {
                id: id.clone(),
                name: name.to_string(),
            },
        );
        id
    }

    /// Whether a room with this id exists.
    pub fn room_exists(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Create a channel under an existing room and return its id.
    ///
    /// Fails with `NotFound` if the room is unknown.
    pub fn create_channel(&mut self, room_id: &str, name: &str) -> Result<String, ChatError> {
        self.require_room(room_id)?;

        let id = new_entity_id();
        self.channels.entry(room_id.to_string()).or_default().insert(
            id.clone(),
            Channel {
                id: id.clone(),
                name: name.to_string(),
                room_id: room_id.to_string(),
            },
        );
        Ok(id)
    }

    /// Greeting for `username` joining a room.
    pub fn join(&self, room_id: &str, username: &str) -> Result<String, ChatError> {
        let room = self.require_room(room_id)?;
        Ok(format!("{} just slid into the server {}", username, room.name))
    }

    /// Farewell for `username` leaving a room.
    pub fn leave(&self, room_id: &str, username: &str) -> Result<String, ChatError> {
        let room = self.require_room(room_id)?;
        Ok(format!("{} just left the server {}", username, room.name))
    }

    fn require_room(&self, room_id: &str) -> Result<&ChatRoom, ChatError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| ChatError::NotFound(format!("chat server {} not found", room_id)))
    }
}

#[cfg(test)]
impl Registry {
    pub(crate) fn room(&self, room_id: &str) -> Option<&ChatRoom> {
        self.rooms.get(room_id)
    }

    pub(crate) fn channel(&self, room_id: &str, channel_id: &str) -> Option<&Channel> {
        self.channels.get(room_id)?.get(channel_id)
    }

    pub(crate) fn channels_in(&self, room_id: &str) -> Vec<&Channel> {
        self.channels
            .get(room_id)
            .map(|channels| channels.values().collect())
            .unwrap_or_default()
    }

    pub(crate) fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
