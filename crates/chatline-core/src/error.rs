use thiserror::Error;

/// Protocol-wide error types for the Chatline service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Missing or unknown session token on an operation that enforces auth.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Unknown room or channel reference.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input (e.g. empty username on login).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Stream send/receive failure, including peer disconnect.
    #[error("I/O failure: {0}")]
    Io(String),

    /// Shared state could not be accessed (poisoned lock).
    #[error("Storage error: {0}")]
    Storage(String),
}
