// crates/chatline-rpc/tests/end_to_end.rs
//
// End-to-end tests: a real tonic server on 127.0.0.1:0 driven through
// ChatClient over HTTP/2.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::Code;

use chatline_rpc::proto::{self, ChatMessage, SendMessageRequest};
use chatline_rpc::{ChatClient, ChatRpcServer, RpcConfig};
use chatline_store::ChatStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let config = RpcConfig {
            host: "127.0.0.1".to_string(),
            port: addr.port(),
            stream_buffer: 4,
        };
        let server = ChatRpcServer::new(config, Arc::new(ChatStore::new()));
        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(listener, async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    async fn client(&self) -> ChatClient {
        ChatClient::connect(format!("http://{}", self.addr))
            .await
            .unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap();
    }
}

fn send_request(room: &str, channel: &str, user: &str, text: &str) -> SendMessageRequest {
    SendMessageRequest {
        server_id: room.to_string(),
        channel_id: channel.to_string(),
        username: user.to_string(),
        text: text.to_string(),
    }
}

async fn replay_texts(client: &mut ChatClient, room: &str, channel: &str) -> Vec<String> {
    let mut stream = client.list_messages(room, channel).await.unwrap();
    let mut texts = Vec::new();
    while let Some(msg) = stream.message().await.unwrap() {
        texts.push(msg.text);
    }
    texts
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_create_send_and_list() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let login = client.login("alice", "x").await.unwrap();
    assert_eq!(login.message, "Login successful");
    assert_eq!(client.token(), Some(login.token.as_str()));

    let room = client.create_chat_server("rustaceans").await.unwrap();
    let channel = client.create_channel(&room, "general").await.unwrap();

    let batch = vec![
        send_request(&room, &channel, "alice", "first"),
        send_request(&room, &channel, "alice", "second"),
        send_request(&room, &channel, "alice", "third"),
    ];
    let count = client
        .send_messages(tokio_stream::iter(batch))
        .await
        .unwrap();
    assert_eq!(count, 3);

    let mut stream = client.list_messages(&room, &channel).await.unwrap();
    let mut replayed = Vec::new();
    while let Some(msg) = stream.message().await.unwrap() {
        assert_eq!(msg.username, "alice");
        assert!(msg.timestamp.is_some());
        replayed.push(msg.text);
    }
    assert_eq!(replayed, vec!["first", "second", "third"]);

    // Replay does not drain the log.
    assert_eq!(replay_texts(&mut client, &room, &channel).await.len(), 3);

    server.stop().await;
}

#[tokio::test]
async fn test_create_chat_server_auth_gate() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let status = client.create_chat_server("lobby").await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    let mut forged = server.client().await.with_token("deadbeef");
    let status = forged.create_chat_server("lobby").await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    client.login("alice", "x").await.unwrap();
    assert!(client.create_chat_server("lobby").await.is_ok());

    server.stop().await;
}

#[tokio::test]
async fn test_create_channel_auth_gate_and_unknown_room() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.login("alice", "x").await.unwrap();
    let room = client.create_chat_server("lobby").await.unwrap();

    let status = client.create_channel("no-such-room", "general").await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    client.clear_token();
    let status = client.create_channel(&room, "general").await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    server.stop().await;
}

#[tokio::test]
async fn test_relogin_revokes_previous_token() {
    let server = TestServer::start().await;
    let mut first = server.client().await;
    let old_token = first.login("alice", "x").await.unwrap().token;

    let mut second = server.client().await;
    second.login("alice", "x").await.unwrap();

    let mut stale = server.client().await.with_token(old_token);
    let status = stale.create_chat_server("lobby").await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert!(second.create_chat_server("lobby").await.is_ok());

    server.stop().await;
}

#[tokio::test]
async fn test_login_empty_username_rejected() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let status = client.login("", "x").await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(client.token(), None);

    server.stop().await;
}

#[tokio::test]
async fn test_login_whitespace_username_accepted() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let login = client.login("   ", "x").await.unwrap();
    assert_eq!(login.message, "Login successful");
    assert!(client.create_chat_server("blank").await.is_ok());

    server.stop().await;
}

#[tokio::test]
async fn test_join_and_leave() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.login("alice", "x").await.unwrap();
    let room = client.create_chat_server("rustaceans").await.unwrap();

    let welcome = client.join_chat_server(&room, "bob").await.unwrap();
    assert_eq!(welcome, "bob just slid into the server rustaceans");
    let goodbye = client.leave_chat_server(&room, "bob").await.unwrap();
    assert_eq!(goodbye, "bob just left the server rustaceans");

    let status = client.join_chat_server("no-such-room", "bob").await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    let status = client.leave_chat_server("no-such-room", "bob").await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    server.stop().await;
}

#[tokio::test]
async fn test_list_messages_not_found_cases() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.login("alice", "x").await.unwrap();
    let room = client.create_chat_server("lobby").await.unwrap();
    let channel = client.create_channel(&room, "quiet").await.unwrap();

    let status = client.list_messages("no-such-room", &channel).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    // A channel nobody has written to has no history yet.
    for _ in 0..2 {
        let status = client.list_messages(&room, &channel).await.unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_same_name_channels_are_isolated() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.login("alice", "x").await.unwrap();

    let r1 = client.create_chat_server("one").await.unwrap();
    let r2 = client.create_chat_server("two").await.unwrap();
    let c1 = client.create_channel(&r1, "general").await.unwrap();
    let c2 = client.create_channel(&r2, "general").await.unwrap();

    client
        .send_messages(tokio_stream::iter(vec![send_request(&r1, &c1, "alice", "only c1")]))
        .await
        .unwrap();
    client
        .send_messages(tokio_stream::iter(vec![send_request(&r2, &c2, "bob", "only c2")]))
        .await
        .unwrap();

    assert_eq!(replay_texts(&mut client, &r1, &c1).await, vec!["only c1"]);
    assert_eq!(replay_texts(&mut client, &r2, &c2).await, vec!["only c2"]);

    server.stop().await;
}

#[tokio::test]
async fn test_send_messages_empty_stream_counts_zero() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let count = client
        .send_messages(tokio_stream::iter(Vec::<SendMessageRequest>::new()))
        .await
        .unwrap();
    assert_eq!(count, 0);

    server.stop().await;
}

#[tokio::test]
async fn test_chat_echoes_with_new_timestamp() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.login("bob", "x").await.unwrap();
    let room = client.create_chat_server("lobby").await.unwrap();
    let channel = client.create_channel(&room, "general").await.unwrap();

    let sent_at = Utc::now();
    let outbound = vec![
        ChatMessage {
            server_id: room.clone(),
            channel_id: channel.clone(),
            username: "bob".to_string(),
            text: "hi".to_string(),
            timestamp: None,
        },
        ChatMessage {
            server_id: room.clone(),
            channel_id: channel.clone(),
            username: "bob".to_string(),
            text: "again".to_string(),
            timestamp: None,
        },
    ];

    let mut echoes = client.chat(tokio_stream::iter(outbound)).await.unwrap();
    let mut received = Vec::new();
    while let Some(echo) = echoes.message().await.unwrap() {
        received.push(echo);
    }

    assert_eq!(received.len(), 2);
    assert_eq!(received[0].username, "bob");
    assert_eq!(received[0].text, "hi");
    assert_eq!(received[0].server_id, room);
    assert_eq!(received[0].channel_id, channel);
    assert_eq!(received[1].text, "again");
    for echo in &received {
        let stamped = proto::from_timestamp(echo.timestamp.as_ref().unwrap()).unwrap();
        assert!(stamped >= sent_at);
    }

    // Chat messages land in the same history ListMessages replays.
    assert_eq!(replay_texts(&mut client, &room, &channel).await, vec!["hi", "again"]);

    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_senders_all_recorded() {
    let server = TestServer::start().await;
    let mut admin = server.client().await;
    admin.login("admin", "x").await.unwrap();
    let room = admin.create_chat_server("busy").await.unwrap();
    let channel = admin.create_channel(&room, "general").await.unwrap();

    let mut tasks = Vec::new();
    for n in 0..4 {
        let mut client = server.client().await;
        let (room, channel) = (room.clone(), channel.clone());
        tasks.push(tokio::spawn(async move {
            let user = format!("user{}", n);
            let batch: Vec<SendMessageRequest> = (0..25)
                .map(|i| send_request(&room, &channel, &user, &i.to_string()))
                .collect();
            client.send_messages(tokio_stream::iter(batch)).await.unwrap()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 25);
    }

    assert_eq!(replay_texts(&mut admin, &room, &channel).await.len(), 100);

    server.stop().await;
}
