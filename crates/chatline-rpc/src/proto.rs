// crates/chatline-rpc/src/proto.rs
//
// Protobuf message types for the `chat.ChatServer` service.
//
// Derived by hand with `prost` instead of build-time codegen, so building the
// workspace needs no `protoc`. Field numbers mirror `proto/chat.proto`.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "chat.ChatServer";

/// Method paths, `/<service>/<method>`.
pub mod paths {
    pub const LOGIN: &str = "/chat.ChatServer/Login";
    pub const CREATE_CHAT_SERVER: &str = "/chat.ChatServer/CreateChatServer";
    pub const JOIN_CHAT_SERVER: &str = "/chat.ChatServer/JoinChatServer";
    pub const LEAVE_CHAT_SERVER: &str = "/chat.ChatServer/LeaveChatServer";
    pub const CREATE_CHANNEL: &str = "/chat.ChatServer/CreateChannel";
    pub const LIST_MESSAGES: &str = "/chat.ChatServer/ListMessages";
    pub const SEND_MESSAGES: &str = "/chat.ChatServer/SendMessages";
    pub const CHAT: &str = "/chat.ChatServer/Chat";
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginRequest {
    #[prost(string, tag = "1")]
    pub username: String,
    /// Accepted but not verified.
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginResponse {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(string, tag = "2")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Rooms and channels
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateChatServerRequest {
    #[prost(string, tag = "1")]
    pub server_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateChatServerResponse {
    #[prost(string, tag = "1")]
    pub server_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JoinChatServerRequest {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub username: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JoinChatServerResponse {
    #[prost(string, tag = "1")]
    pub welcome_message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LeaveChatServerRequest {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub username: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LeaveChatServerResponse {
    #[prost(string, tag = "1")]
    pub goodbye_message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateChannelRequest {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub channel_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateChannelResponse {
    #[prost(string, tag = "1")]
    pub channel_id: String,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListMessagesRequest {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
}

/// A stored message as replayed by ListMessages.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub username: String,
    #[prost(string, tag = "2")]
    pub text: String,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessageRequest {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub text: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessagesResponse {
    #[prost(int32, tag = "1")]
    pub message_count: i32,
}

/// Both the inbound and the echoed item of the Chat call.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChatMessage {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub text: String,
    /// Ignored on input; set by the server on the echo.
    #[prost(message, optional, tag = "5")]
    pub timestamp: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Convert a chrono UTC instant to a protobuf timestamp.
pub fn to_timestamp(instant: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: instant.timestamp(),
        nanos: instant.timestamp_subsec_nanos() as i32,
    }
}

/// Convert a protobuf timestamp back to a chrono UTC instant.
///
/// Returns `None` for out-of-range values.
pub fn from_timestamp(timestamp: &Timestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(timestamp.nanos).ok()?;
    DateTime::<Utc>::from_timestamp(timestamp.seconds, nanos)
}

impl From<chatline_core::Message> for Message {
    fn from(message: chatline_core::Message) -> Self {
        Self {
            timestamp: Some(to_timestamp(&message.timestamp)),
            username: message.username,
            text: message.text,
        }
    }
}
