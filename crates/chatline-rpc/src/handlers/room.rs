// crates/chatline-rpc/src/handlers/room.rs
//
// Room lifecycle handlers: CreateChatServer, JoinChatServer, LeaveChatServer,
// CreateChannel.
//
// Authentication for the create calls is checked by the service before these
// run; the handlers only touch the registry.

use chatline_core::error::ChatError;
use chatline_store::ChatStore;

use crate::proto::{
    CreateChannelRequest, CreateChannelResponse, CreateChatServerRequest,
    CreateChatServerResponse, JoinChatServerRequest, JoinChatServerResponse,
    LeaveChatServerRequest, LeaveChatServerResponse,
};

// ---------------------------------------------------------------------------
// CreateChatServer
// ---------------------------------------------------------------------------

/// Handle a CreateChatServer request. Always succeeds.
pub async fn handle_create_chat_server(
    store: &ChatStore,
    request: CreateChatServerRequest,
) -> Result<CreateChatServerResponse, ChatError> {
    let server_id = store.create_room(&request.server_name)?;

    tracing::info!(
        "Chat server created: id={} name={}",
        server_id,
        request.server_name
    );

    Ok(CreateChatServerResponse { server_id })
}

// ---------------------------------------------------------------------------
// JoinChatServer / LeaveChatServer
// ---------------------------------------------------------------------------

/// Handle a JoinChatServer request.
///
/// Membership is not tracked; the room only has to exist.
pub async fn handle_join_chat_server(
    store: &ChatStore,
    request: JoinChatServerRequest,
) -> Result<JoinChatServerResponse, ChatError> {
    let welcome_message = store.join(&request.server_id, &request.username)?;
    tracing::info!("{} joined chat server {}", request.username, request.server_id);
    Ok(JoinChatServerResponse { welcome_message })
}

/// Handle a LeaveChatServer request.
pub async fn handle_leave_chat_server(
    store: &ChatStore,
    request: LeaveChatServerRequest,
) -> Result<LeaveChatServerResponse, ChatError> {
    let goodbye_message = store.leave(&request.server_id, &request.username)?;
    tracing::info!("{} left chat server {}", request.username, request.server_id);
    Ok(LeaveChatServerResponse { goodbye_message })
}

// ---------------------------------------------------------------------------
// CreateChannel
// ---------------------------------------------------------------------------

/// Handle a CreateChannel request. Fails with `NotFound` for an unknown room.
pub async fn handle_create_channel(
    store: &ChatStore,
    request: CreateChannelRequest,
) -> Result<CreateChannelResponse, ChatError> {
    let channel_id = store.create_channel(&request.server_id, &request.channel_name)?;

    tracing::info!(
        "Channel created: id={} name={} server={}",
        channel_id,
        request.channel_name,
        request.server_id
    );

    Ok(CreateChannelResponse { channel_id })
}
