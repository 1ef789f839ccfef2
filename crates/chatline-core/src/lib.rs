// crates/chatline-core/src/lib.rs
//
// chatline-core: Core types, errors, and id/token helpers for Chatline.
//
// This is the leaf crate that every other crate in the workspace depends on.
// It defines the canonical chat data structures (sessions, rooms, channels,
// messages), the protocol-wide error type, and the random generators used for
// session tokens and entity ids.

pub mod crypto;
pub mod error;
pub mod message;
pub mod room;
pub mod session;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use chatline_core::Message;`

pub use message::Message;
pub use room::{Channel, ChatRoom};
pub use session::Session;

// Error type
pub use error::ChatError;
