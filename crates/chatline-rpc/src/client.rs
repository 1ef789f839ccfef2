// crates/chatline-rpc/src/client.rs
//
// Typed gRPC client for the `chat.ChatServer` service.
//
// After a successful `login` the client keeps the token and attaches it as
// `authorization: Bearer <token>` to every later call. Errors are always
// returned to the caller.

use http::uri::PathAndQuery;
use tokio_stream::Stream;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status, Streaming};

use crate::middleware::AUTHORIZATION_KEY;
use crate::proto::{
    paths, ChatMessage, CreateChannelRequest, CreateChannelResponse, CreateChatServerRequest,
    CreateChatServerResponse, JoinChatServerRequest, JoinChatServerResponse,
    LeaveChatServerRequest, LeaveChatServerResponse, ListMessagesRequest, LoginRequest,
    LoginResponse, Message, SendMessageRequest, SendMessagesResponse,
};

/// Client for a Chatline server.
#[derive(Debug, Clone)]
pub struct ChatClient {
    inner: Grpc<Channel>,
    token: Option<String>,
}

impl ChatClient {
    /// Connect to a server at `endpoint` (e.g. "http://127.0.0.1:50051").
    pub async fn connect(
        endpoint: impl Into<String>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let channel = Endpoint::from_shared(endpoint.into())?.connect().await?;
        Ok(Self::new(channel))
    }

    /// Wrap an existing channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
            token: None,
        }
    }

    /// Use a token obtained elsewhere.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The token attached to outgoing calls, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Forget the stored token; later calls go out unauthenticated.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn request<T>(&self, message: T) -> Result<Request<T>, Status> {
        let mut request = Request::new(message);
        if let Some(token) = &self.token {
            let value: AsciiMetadataValue = format!("Bearer {}", token)
                .parse()
                .map_err(|_| Status::invalid_argument("token is not valid ASCII metadata"))?;
            request.metadata_mut().insert(AUTHORIZATION_KEY, value);
        }
        Ok(request)
    }

    async fn ready(&mut self) -> Result<(), Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("Service was not ready: {}", e)))
    }

    // -- unary -------------------------------------------------------------

    /// Log in and remember the issued token.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse, Status> {
        let request = self.request(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        self.ready().await?;
        let response: LoginResponse = self
            .inner
            .unary(request, PathAndQuery::from_static(paths::LOGIN), ProstCodec::default())
            .await?
            .into_inner();

        self.token = Some(response.token.clone());
        Ok(response)
    }

    /// Create a room and return its id. Requires a token.
    pub async fn create_chat_server(&mut self, server_name: &str) -> Result<String, Status> {
        let request = self.request(CreateChatServerRequest {
            server_name: server_name.to_string(),
        })?;
        self.ready().await?;
        let response: Response<CreateChatServerResponse> = self
            .inner
            .unary(
                request,
                PathAndQuery::from_static(paths::CREATE_CHAT_SERVER),
                ProstCodec::default(),
            )
            .await?;
        Ok(response.into_inner().server_id)
    }

    /// Join a room and return the welcome text.
    pub async fn join_chat_server(
        &mut self,
        server_id: &str,
        username: &str,
    ) -> Result<String, Status> {
        let request = self.request(JoinChatServerRequest {
            server_id: server_id.to_string(),
            username: username.to_string(),
        })?;
        self.ready().await?;
        let response: Response<JoinChatServerResponse> = self
            .inner
            .unary(
                request,
                PathAndQuery::from_static(paths::JOIN_CHAT_SERVER),
                ProstCodec::default(),
            )
            .await?;
        Ok(response.into_inner().welcome_message)
    }

    /// Leave a room and return the farewell text.
    pub async fn leave_chat_server(
        &mut self,
        server_id: &str,
        username: &str,
    ) -> Result<String, Status> {
        let request = self.request(LeaveChatServerRequest {
            server_id: server_id.to_string(),
            username: username.to_string(),
        })?;
        self.ready().await?;
        let response: Response<LeaveChatServerResponse> = self
            .inner
            .unary(
                request,
                PathAndQuery::from_static(paths::LEAVE_CHAT_SERVER),
                ProstCodec::default(),
            )
            .await?;
        Ok(response.into_inner().goodbye_message)
    }

    /// Create a channel in a room and return its id. Requires a token.
    pub async fn create_channel(
        &mut self,
        server_id: &str,
        channel_name: &str,
    ) -> Result<String, Status> {
        let request = self.request(CreateChannelRequest {
            server_id: server_id.to_string(),
            channel_name: channel_name.to_string(),
        })?;
        self.ready().await?;
        let response: Response<CreateChannelResponse> = self
            .inner
            .unary(
                request,
                PathAndQuery::from_static(paths::CREATE_CHANNEL),
                ProstCodec::default(),
            )
            .await?;
        Ok(response.into_inner().channel_id)
    }

    // -- streaming ---------------------------------------------------------

    /// Replay a channel's history as a stream, oldest first.
    pub async fn list_messages(
        &mut self,
        server_id: &str,
        channel_id: &str,
    ) -> Result<Streaming<Message>, Status> {
        let request = self.request(ListMessagesRequest {
            server_id: server_id.to_string(),
            channel_id: channel_id.to_string(),
        })?;
        self.ready().await?;
        let response = self
            .inner
            .server_streaming(
                request,
                PathAndQuery::from_static(paths::LIST_MESSAGES),
                ProstCodec::default(),
            )
            .await?;
        Ok(response.into_inner())
    }

    /// Submit a batch of messages and return how many the server stored.
    pub async fn send_messages<S>(&mut self, messages: S) -> Result<i32, Status>
    where
        S: Stream<Item = SendMessageRequest> + Send + 'static,
    {
        let request = self.request(messages)?;
        self.ready().await?;
        let response: Response<SendMessagesResponse> = self
            .inner
            .client_streaming(
                request,
                PathAndQuery::from_static(paths::SEND_MESSAGES),
                ProstCodec::default(),
            )
            .await?;
        Ok(response.into_inner().message_count)
    }

    /// Open a live chat: every outbound message comes back as a stamped echo.
    pub async fn chat<S>(&mut self, messages: S) -> Result<Streaming<ChatMessage>, Status>
    where
        S: Stream<Item = ChatMessage> + Send + 'static,
    {
        let request = self.request(messages)?;
        self.ready().await?;
        let response = self
            .inner
            .streaming(request, PathAndQuery::from_static(paths::CHAT), ProstCodec::default())
            .await?;
        Ok(response.into_inner())
    }
}
