// crates/chatline-store/src/lib.rs
//
// chatline-store: In-memory state for the Chatline service.
//
// Provides the session table (`TokenStore`), the room/channel registry
// (`Registry`), the append-only per-channel history (`MessageLog`), and
// `ChatStore`, which owns all three behind a single process-wide lock.

pub mod log;
pub mod registry;
pub mod shared;
pub mod tokens;

// Re-export key types for ergonomic access from downstream crates.
pub use log::MessageLog;
pub use registry::Registry;
pub use shared::ChatStore;
pub use tokens::TokenStore;
