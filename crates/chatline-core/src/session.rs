// crates/chatline-core/src/session.rs

use serde::{Deserialize, Serialize};

/// An authenticated session: the latest token issued to a username.
///
/// Re-login replaces the session, so at most one token per username is live.
/// Sessions do not expire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    /// Opaque bearer token handed back by Login.
    pub token: String,
}
