// crates/chatline-core/src/room.rs

use serde::{Deserialize, Serialize};

/// A chat server ("room"). Created once, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRoom {
    /// UUID string assigned at creation.
    pub id: String,
    /// Display name chosen by the creator. Not unique.
    pub name: String,
}

/// A channel inside a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    /// UUID string assigned at creation.
    pub id: String,
    /// Display name. Two channels may share a name; ids keep them apart.
    pub name: String,
    /// Id of the owning room. Checked to exist when the channel is created.
    pub room_id: String,
}
