// crates/chatline-rpc/src/handlers/messages.rs
//
// Messaging handlers: ListMessages (server streaming), SendMessages (client
// streaming), Chat (bidirectional).
//
// The store lock is taken only inside synchronous `ChatStore` calls, never
// while awaiting the network. Inbound streams are generic so the handlers can
// be driven by `tonic::Streaming` in production and by plain iterators in
// tests. An inbound `Status` error is returned or forwarded unchanged.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::Status;

use chatline_core::error::ChatError;
use chatline_core::message::Message;
use chatline_store::ChatStore;

use crate::error::to_status;
use crate::proto::{
    self, ChatMessage, ListMessagesRequest, SendMessageRequest, SendMessagesResponse,
};

// ---------------------------------------------------------------------------
// ListMessages
// ---------------------------------------------------------------------------

/// Handle a ListMessages request.
///
/// Checks the room and copies the channel history under one lock hold, then
/// streams the copy through a bounded channel fed by a producer task. The
/// producer stops as soon as the receiving side is gone.
pub async fn handle_list_messages(
    store: &ChatStore,
    request: ListMessagesRequest,
    buffer: usize,
) -> Result<ReceiverStream<Result<proto::Message, Status>>, ChatError> {
    let messages = store.replay_in_room(&request.server_id, &request.channel_id)?;

    let (tx, rx) = mpsc::channel(buffer.max(1));
    tokio::spawn(feed_history(messages, request.channel_id, tx));

    Ok(ReceiverStream::new(rx))
}

/// Producer half of a ListMessages call.
async fn feed_history(
    messages: Vec<Message>,
    channel_id: String,
    outbound: mpsc::Sender<Result<proto::Message, Status>>,
) {
    let total = messages.len();
    for (sent, message) in messages.into_iter().enumerate() {
        if outbound.send(Ok(proto::Message::from(message))).await.is_err() {
            tracing::warn!(
                "ListMessages for channel {} aborted: peer went away after {}/{} messages",
                channel_id,
                sent,
                total
            );
            return;
        }
    }
    tracing::debug!("ListMessages for channel {} sent {} messages", channel_id, total);
}

// ---------------------------------------------------------------------------
// SendMessages
// ---------------------------------------------------------------------------

/// Handle a SendMessages client stream.
///
/// Appends every inbound item and answers once with the count on clean
/// end-of-input. Room and channel ids are used as storage keys without
/// validation.
pub async fn handle_send_messages<S>(
    store: &ChatStore,
    mut inbound: S,
) -> Result<SendMessagesResponse, Status>
where
    S: Stream<Item = Result<SendMessageRequest, Status>> + Unpin + Send,
{
    let mut message_count: i32 = 0;

    while let Some(item) = inbound.next().await {
        let request = item?;
        store
            .append(&request.channel_id, &request.username, &request.text)
            .map_err(to_status)?;

        tracing::debug!("Message received from {}: {}", request.username, request.text);
        message_count = message_count.saturating_add(1);
    }

    tracing::info!("SendMessages stream closed after {} messages", message_count);
    Ok(SendMessagesResponse { message_count })
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Handle a Chat bidirectional stream.
///
/// A spawned reader task consumes the inbound stream, appends each message,
/// and queues the echo; the returned stream is drained by the transport as
/// the writer. The two sides share nothing but the store and the queue.
pub fn handle_chat<S>(
    store: Arc<ChatStore>,
    inbound: S,
    buffer: usize,
) -> ReceiverStream<Result<ChatMessage, Status>>
where
    S: Stream<Item = Result<ChatMessage, Status>> + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));
    tokio::spawn(relay_chat(store, inbound, tx));
    ReceiverStream::new(rx)
}

/// Reader half of a Chat call.
async fn relay_chat<S>(
    store: Arc<ChatStore>,
    mut inbound: S,
    outbound: mpsc::Sender<Result<ChatMessage, Status>>,
) where
    S: Stream<Item = Result<ChatMessage, Status>> + Unpin + Send,
{
    loop {
        let next = tokio::select! {
            _ = outbound.closed() => {
                tracing::warn!("Chat stream aborted: peer stopped reading");
                return;
            }
            next = inbound.next() => next,
        };

        let incoming = match next {
            None => {
                tracing::debug!("Chat stream closed by peer");
                return;
            }
            Some(Err(status)) => {
                tracing::warn!("Chat stream receive failed: {}", status);
                let _ = outbound.send(Err(status)).await;
                return;
            }
            Some(Ok(message)) => message,
        };

        tracing::debug!("Message received from {}: {}", incoming.username, incoming.text);

        let appended = store.append(&incoming.channel_id, &incoming.username, &incoming.text);
        let timestamp = match appended {
            Ok(ts) => ts,
            Err(e) => {
                let _ = outbound.send(Err(to_status(e))).await;
                return;
            }
        };

        let echo = ChatMessage {
            timestamp: Some(proto::to_timestamp(&timestamp)),
            ..incoming
        };
        if outbound.send(Ok(echo)).await.is_err() {
            tracing::warn!("Chat stream aborted: peer stopped reading");
            return;
        }
    }
}
