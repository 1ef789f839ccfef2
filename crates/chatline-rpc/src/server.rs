// crates/chatline-rpc/src/server.rs
//
// RPC server setup: RpcConfig, ChatService, and ChatRpcServer.
//
// The `chat.ChatServer` gRPC service is wired by hand on top of tonic's
// `Grpc` dispatcher and `ProstCodec`, using the message types in
// `crate::proto`. This keeps protoc out of the build while still speaking
// standard protobuf over HTTP/2, including all three streaming modes.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_stream::Stream;
use tonic::codec::ProstCodec;
use tonic::server::{
    ClientStreamingService, Grpc, NamedService, ServerStreamingService, StreamingService,
    UnaryService,
};
use tonic::service::interceptor::InterceptedService;
use tonic::transport::server::Router;
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

use chatline_store::ChatStore;

use crate::error::to_status;
use crate::handlers;
use crate::middleware;
use crate::proto::{
    self, paths, ChatMessage, CreateChannelRequest, CreateChannelResponse,
    CreateChatServerRequest, CreateChatServerResponse, JoinChatServerRequest,
    JoinChatServerResponse, LeaveChatServerRequest, LeaveChatServerResponse, ListMessagesRequest,
    LoginRequest, LoginResponse, SendMessageRequest, SendMessagesResponse,
};

/// Outbound stream type of the server-streaming and bidirectional calls.
pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Capacity of the per-call queue behind each outbound stream.
    pub stream_buffer: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            stream_buffer: 32,
        }
    }
}

impl RpcConfig {
    /// Parse `host:port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

// ---------------------------------------------------------------------------
// ChatService
// ---------------------------------------------------------------------------

/// The RPC-facing façade over the shared chat state.
///
/// One method per RPC. Login, join, leave, and all messaging calls are open;
/// CreateChatServer and CreateChannel require a valid session token.
#[derive(Debug, Clone)]
pub struct ChatService {
    store: Arc<ChatStore>,
    stream_buffer: usize,
}

impl ChatService {
    /// Create a service over the given store with the default stream buffer.
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self {
            store,
            stream_buffer: RpcConfig::default().stream_buffer,
        }
    }

    /// Set the capacity of outbound stream queues.
    pub fn with_stream_buffer(mut self, stream_buffer: usize) -> Self {
        self.stream_buffer = stream_buffer.max(1);
        self
    }

    /// The shared store behind this service.
    pub fn store(&self) -> &Arc<ChatStore> {
        &self.store
    }

    pub async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let resp = handlers::session::handle_login(&self.store, request.into_inner())
            .await
            .map_err(to_status)?;
        Ok(Response::new(resp))
    }

    pub async fn create_chat_server(
        &self,
        request: Request<CreateChatServerRequest>,
    ) -> Result<Response<CreateChatServerResponse>, Status> {
        let username =
            middleware::authenticate(&self.store, request.metadata()).map_err(to_status)?;
        tracing::debug!("CreateChatServer authorized for {}", username);

        let resp = handlers::room::handle_create_chat_server(&self.store, request.into_inner())
            .await
            .map_err(to_status)?;
        Ok(Response::new(resp))
    }

    pub async fn join_chat_server(
        &self,
        request: Request<JoinChatServerRequest>,
    ) -> Result<Response<JoinChatServerResponse>, Status> {
        let resp = handlers::room::handle_join_chat_server(&self.store, request.into_inner())
            .await
            .map_err(to_status)?;
        Ok(Response::new(resp))
    }

    pub async fn leave_chat_server(
        &self,
        request: Request<LeaveChatServerRequest>,
    ) -> Result<Response<LeaveChatServerResponse>, Status> {
        let resp = handlers::room::handle_leave_chat_server(&self.store, request.into_inner())
            .await
            .map_err(to_status)?;
        Ok(Response::new(resp))
    }

    pub async fn create_channel(
        &self,
        request: Request<CreateChannelRequest>,
    ) -> Result<Response<CreateChannelResponse>, Status> {
        let username =
            middleware::authenticate(&self.store, request.metadata()).map_err(to_status)?;
        tracing::debug!("CreateChannel authorized for {}", username);

        let resp = handlers::room::handle_create_channel(&self.store, request.into_inner())
            .await
            .map_err(to_status)?;
        Ok(Response::new(resp))
    }

    pub async fn list_messages(
        &self,
        request: Request<ListMessagesRequest>,
    ) -> Result<Response<ResponseStream<proto::Message>>, Status> {
        let stream = handlers::messages::handle_list_messages(
            &self.store,
            request.into_inner(),
            self.stream_buffer,
        )
        .await
        .map_err(to_status)?;

        let stream: ResponseStream<proto::Message> = Box::pin(stream);
        Ok(Response::new(stream))
    }

    pub async fn send_messages<S>(
        &self,
        request: Request<S>,
    ) -> Result<Response<SendMessagesResponse>, Status>
    where
        S: Stream<Item = Result<SendMessageRequest, Status>> + Unpin + Send,
    {
        let resp =
            handlers::messages::handle_send_messages(&self.store, request.into_inner()).await?;
        Ok(Response::new(resp))
    }

    pub async fn chat<S>(
        &self,
        request: Request<S>,
    ) -> Result<Response<ResponseStream<ChatMessage>>, Status>
    where
        S: Stream<Item = Result<ChatMessage, Status>> + Unpin + Send + 'static,
    {
        let stream = handlers::messages::handle_chat(
            Arc::clone(&self.store),
            request.into_inner(),
            self.stream_buffer,
        );

        let stream: ResponseStream<ChatMessage> = Box::pin(stream);
        Ok(Response::new(stream))
    }
}

// ---------------------------------------------------------------------------
// ChatRpcServer
// ---------------------------------------------------------------------------

/// The gRPC server for Chatline.
///
/// Owns the configuration and a handle to the shared store; every call runs
/// on its own tokio task.
#[derive(Debug, Clone)]
pub struct ChatRpcServer {
    config: RpcConfig,
    store: Arc<ChatStore>,
}

impl ChatRpcServer {
    /// Create a new ChatRpcServer over an existing store.
    pub fn new(config: RpcConfig, store: Arc<ChatStore>) -> Self {
        Self { config, store }
    }

    fn router(&self) -> Router {
        let service = ChatService::new(Arc::clone(&self.store))
            .with_stream_buffer(self.config.stream_buffer);

        Server::builder().add_service(InterceptedService::new(
            ChatServerService::new(service),
            middleware::logging_interceptor,
        ))
    }

    /// Bind the configured address and serve until the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.socket_addr()?;
        tracing::info!("Chatline RPC server starting on {}", addr);
        self.router().serve(addr).await?;
        Ok(())
    }

    /// Bind the configured address and serve until `signal` resolves.
    pub async fn start_with_shutdown<F>(&self, signal: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_shutdown(listener, signal).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `signal` resolves.
    ///
    /// In-flight streams are not cancelled by the signal.
    pub async fn serve_with_shutdown<F>(
        &self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()> + Send,
    {
        match listener.local_addr() {
            Ok(addr) => tracing::info!("Chatline RPC server listening on {}", addr),
            Err(e) => tracing::warn!("Chatline RPC server listening (address unknown: {})", e),
        }

        self.router()
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
            .await?;

        tracing::info!("Chatline RPC server stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// One small adapter per method implements the matching tonic::server trait,
// and `ChatServerService` routes by request path to `Grpc` with a prost codec.

/// The tonic service wrapper that routes `chat.ChatServer` calls.
#[derive(Debug, Clone)]
pub struct ChatServerService {
    inner: Arc<ChatService>,
}

impl ChatServerService {
    pub fn new(inner: ChatService) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl NamedService for ChatServerService {
    const NAME: &'static str = proto::SERVICE_NAME;
}

struct LoginSvc(Arc<ChatService>);

impl UnaryService<LoginRequest> for LoginSvc {
    type Response = LoginResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<LoginRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.login(request).await })
    }
}

struct CreateChatServerSvc(Arc<ChatService>);

impl UnaryService<CreateChatServerRequest> for CreateChatServerSvc {
    type Response = CreateChatServerResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<CreateChatServerRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.create_chat_server(request).await })
    }
}

struct JoinChatServerSvc(Arc<ChatService>);

impl UnaryService<JoinChatServerRequest> for JoinChatServerSvc {
    type Response = JoinChatServerResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<JoinChatServerRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.join_chat_server(request).await })
    }
}

struct LeaveChatServerSvc(Arc<ChatService>);

impl UnaryService<LeaveChatServerRequest> for LeaveChatServerSvc {
    type Response = LeaveChatServerResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<LeaveChatServerRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.leave_chat_server(request).await })
    }
}

struct CreateChannelSvc(Arc<ChatService>);

impl UnaryService<CreateChannelRequest> for CreateChannelSvc {
    type Response = CreateChannelResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<CreateChannelRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.create_channel(request).await })
    }
}

struct ListMessagesSvc(Arc<ChatService>);

impl ServerStreamingService<ListMessagesRequest> for ListMessagesSvc {
    type Response = proto::Message;
    type ResponseStream = ResponseStream<proto::Message>;
    type Future = BoxFuture<Response<Self::ResponseStream>, Status>;

    fn call(&mut self, request: Request<ListMessagesRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.list_messages(request).await })
    }
}

struct SendMessagesSvc(Arc<ChatService>);

impl ClientStreamingService<SendMessageRequest> for SendMessagesSvc {
    type Response = SendMessagesResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<Streaming<SendMessageRequest>>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.send_messages(request).await })
    }
}

struct ChatSvc(Arc<ChatService>);

impl StreamingService<ChatMessage> for ChatSvc {
    type Response = ChatMessage;
    type ResponseStream = ResponseStream<ChatMessage>;
    type Future = BoxFuture<Response<Self::ResponseStream>, Status>;

    fn call(&mut self, request: Request<Streaming<ChatMessage>>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.chat(request).await })
    }
}

impl<B> tower_service::Service<http::Request<B>> for ChatServerService
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = Arc::clone(&self.inner);

        match req.uri().path() {
            paths::LOGIN => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.unary(LoginSvc(inner), req).await)
            }),
            paths::CREATE_CHAT_SERVER => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.unary(CreateChatServerSvc(inner), req).await)
            }),
            paths::JOIN_CHAT_SERVER => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.unary(JoinChatServerSvc(inner), req).await)
            }),
            paths::LEAVE_CHAT_SERVER => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.unary(LeaveChatServerSvc(inner), req).await)
            }),
            paths::CREATE_CHANNEL => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.unary(CreateChannelSvc(inner), req).await)
            }),
            paths::LIST_MESSAGES => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.server_streaming(ListMessagesSvc(inner), req).await)
            }),
            paths::SEND_MESSAGES => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.client_streaming(SendMessagesSvc(inner), req).await)
            }),
            paths::CHAT => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.streaming(ChatSvc(inner), req).await)
            }),
            _ => {
                tracing::warn!("Unknown RPC method: {}", req.uri().path());
                Box::pin(async move { Ok(unimplemented_response()) })
            }
        }
    }
}

/// Build a trailers-only gRPC response with status UNIMPLEMENTED.
fn unimplemented_response() -> http::Response<tonic::body::BoxBody> {
    let body = tonic::body::BoxBody::new(
        http_body_util::Empty::<bytes::Bytes>::new().map_err(|never| match never {}),
    );

    let mut response = http::Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("grpc-status"),
        HeaderValue::from(tonic::Code::Unimplemented as i32),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
    response
}
