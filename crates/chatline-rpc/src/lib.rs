// crates/chatline-rpc/src/lib.rs
//
// chatline-rpc: gRPC server, handlers, and client for Chatline.
//
// Serves the `chat.ChatServer` service over tonic: login, room and channel
// lifecycle, and three messaging modes (server-streaming history replay,
// client-streaming batch submission, bidirectional live chat). Message types
// are hand-derived with prost rather than generated from a .proto at build
// time.

pub mod client;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod proto;
pub mod server;

// Re-export the main server and client types for ergonomic access.
pub use client::ChatClient;
pub use server::{ChatRpcServer, ChatService, RpcConfig};
