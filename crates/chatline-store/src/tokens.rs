// crates/chatline-store/src/tokens.rs
//
// Session table: issues and validates opaque bearer tokens per username.
//
// Passwords are accepted but never checked against a credential source.
// A token is valid iff it equals the most recently issued token for some
// username; re-login overwrites the previous one.

use std::collections::HashMap;

use chatline_core::crypto::{generate_token, tokens_match};
use chatline_core::error::ChatError;
use chatline_core::session::Session;

/// Username -> latest session.
#[derive(Debug, Default)]
pub struct TokenStore {
    sessions: HashMap<String, Session>,
}

impl TokenStore {
    /// Create an empty session table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `username`, replacing any prior one.
    ///
    /// Fails with `InvalidArgument` if the username is empty.
    pub fn login(&mut self, username: &str, _password: &str) -> Result<String, ChatError> {
        if username.is_empty() {
            return Err(ChatError::InvalidArgument(
                "username must not be empty".to_string(),
            ));
        }

        let token = generate_token();
        self.sessions.insert(
            username.to_string(),
            Session {
                username: username.to_string(),
                token: token.clone(),
            },
        );
        Ok(token)
    }

    /// Whether `token` matches the current token of any username.
    ///
    /// Linear scan over all sessions.
    pub fn authenticate(&self, token: &str) -> bool {
        self.session_for(token).is_some()
    }

    /// The session that currently owns `token`, if any.
    pub fn session_for(&self, token: &str) -> Option<&Session> {
        if token.is_empty() {
            return None;
        }
        self.sessions
            .values()
            .find(|session| tokens_match(&session.token, token))
    }
}

#[cfg(test)]
impl TokenStore {
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
