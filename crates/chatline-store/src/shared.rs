// crates/chatline-store/src/shared.rs
//
// ChatStore: the session table, registry, and message log behind one lock.
//
// Every read or write of chat state goes through `ChatStore` and holds the
// lock only for the in-memory map operation. The guard is a std mutex guard,
// so it cannot be carried across an `.await` in a `Send` future.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use chatline_core::error::ChatError;
use chatline_core::message::Message;

use crate::log::MessageLog;
use crate::registry::Registry;
use crate::tokens::TokenStore;

/// All mutable chat state, owned together.
#[derive(Debug, Default)]
struct ChatState {
    tokens: TokenStore,
    registry: Registry,
    log: MessageLog,
}

/// Process-wide chat state guarded by a single mutual-exclusion lock.
///
/// Each method is atomic in isolation; nothing spans several calls.
#[derive(Debug, Default)]
pub struct ChatStore {
    state: Mutex<ChatState>,
}

impl ChatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ChatState>, ChatError> {
        self.state
            .lock()
            .map_err(|e| ChatError::Storage(format!("Mutex poisoned: {}", e)))
    }

    // -- sessions ----------------------------------------------------------

    pub fn login(&self, username: &str, password: &str) -> Result<String, ChatError> {
        self.lock()?.tokens.login(username, password)
    }

    pub fn authenticate(&self, token: &str) -> Result<bool, ChatError> {
        Ok(self.lock()?.tokens.authenticate(token))
    }

    /// Username owning `token`, if the token is live.
    pub fn username_for(&self, token: &str) -> Result<Option<String>, ChatError> {
        Ok(self
            .lock()?
            .tokens
            .session_for(token)
            .map(|session| session.username.clone()))
    }

    // -- rooms and channels ------------------------------------------------

    pub fn create_room(&self, name: &str) -> Result<String, ChatError> {
        Ok(self.lock()?.registry.create_room(name))
    }

    pub fn room_exists(&self, room_id: &str) -> Result<bool, ChatError> {
        Ok(self.lock()?.registry.room_exists(room_id))
    }

    pub fn create_channel(&self, room_id: &str, name: &str) -> Result<String, ChatError> {
        self.lock()?.registry.create_channel(room_id, name)
    }

    pub fn join(&self, room_id: &str, username: &str) -> Result<String, ChatError> {
        self.lock()?.registry.join(room_id, username)
    }

    pub fn leave(&self, room_id: &str, username: &str) -> Result<String, ChatError> {
        self.lock()?.registry.leave(room_id, username)
    }

    // -- messages ----------------------------------------------------------

    pub fn append(
        &self,
        channel_id: &str,
        username: &str,
        text: &str,
    ) -> Result<DateTime<Utc>, ChatError> {
        Ok(self.lock()?.log.append(channel_id, username, text))
    }

    pub fn replay(&self, channel_id: &str) -> Result<Vec<Message>, ChatError> {
        self.lock()?.log.replay(channel_id)
    }

    /// Check that the room exists, then replay the channel, under one lock hold.
    ///
    /// The channel is not required to belong to the room.
    pub fn replay_in_room(
        &self,
        room_id: &str,
        channel_id: &str,
    ) -> Result<Vec<Message>, ChatError> {
        let state = self.lock()?;
        if !state.registry.room_exists(room_id) {
            return Err(ChatError::NotFound(format!(
                "chat server {} not found",
                room_id
            )));
        }
        state.log.replay(channel_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_full_flow_through_store() {
        let store = ChatStore::new();
        let token = store.login("alice", "x").unwrap();
        assert!(store.authenticate(&token).unwrap());
        assert_eq!(store.username_for(&token).unwrap().as_deref(), Some("alice"));

        let room = store.create_room("lobby").unwrap();
        let channel = store.create_channel(&room, "general").unwrap();
        store.append(&channel, "alice", "one").unwrap();
        store.append(&channel, "alice", "two").unwrap();

        let texts: Vec<String> = store
            .replay_in_room(&room, &channel)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_replay_in_room_checks_room_first() {
        let store = ChatStore::new();
        store.append("c1", "alice", "hi").unwrap();

        assert!(matches!(
            store.replay_in_room("missing", "c1"),
            Err(ChatError::NotFound(_))
        ));

        let room = store.create_room("lobby").unwrap();
        assert!(matches!(
            store.replay_in_room(&room, "empty"),
            Err(ChatError::NotFound(_))
        ));
        assert_eq!(store.replay_in_room(&room, "c1").unwrap().len(), 1);
    }

    #[test]
    fn test_same_name_channels_do_not_share_history() {
        let store = ChatStore::new();
        let r1 = store.create_room("one").unwrap();
        let r2 = store.create_room("two").unwrap();
        let a = store.create_channel(&r1, "general").unwrap();
        let b = store.create_channel(&r2, "general").unwrap();

        store.append(&a, "alice", "only in a").unwrap();

        assert_eq!(store.replay(&a).unwrap().len(), 1);
        assert!(store.replay(&b).is_err());
    }

    #[test]
    fn test_concurrent_appends_are_all_recorded() {
        let store = Arc::new(ChatStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store
                            .append("busy", &format!("user{}", t), &format!("{}", i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let messages = store.replay("busy").unwrap();
        assert_eq!(messages.len(), 400);

        // Per-writer order survives interleaving.
        for t in 0..8 {
            let user = format!("user{}", t);
            let seq: Vec<usize> = messages
                .iter()
                .filter(|m| m.username == user)
                .map(|m| m.text.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..50).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_one_lock_owns_all_state() {
        let store = ChatStore::new();
        store.login("alice", "").unwrap();
        let room = store.create_room("lobby").unwrap();
        store.append("c1", "alice", "hi").unwrap();

        let state = store.lock().unwrap();
        assert_eq!(state.tokens.len(), 1);
        assert_eq!(state.registry.room_count(), 1);
        assert!(state.registry.room_exists(&room));
        assert_eq!(state.log.len("c1"), 1);
    }
}
