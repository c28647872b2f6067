//! Test helpers for integration tests
//!
//! Provides a fake gateway server and polling helpers for waiting on
//! asynchronous session behaviour.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, RawQuery, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use courier_gateway::{
    ConnectionState, GatewayClient, HttpRequestClient, Session, SessionConfig, WebSocketTransport,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Token every test client identifies with
pub const TOKEN: &str = "integration-token";

/// Session id the fake hands out in READY
pub const SESSION_ID: &str = "fake-session";

/// Id of the user the fake reports in READY
pub const BOT_USER_ID: u64 = 4242;

/// How long polling helpers wait before failing
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared state between the HTTP routes and the socket handler
struct GatewayState {
    addr: SocketAddr,
    heartbeat_interval: u64,
    auto_ack: AtomicBool,
    connections: AtomicUsize,
    sequence: AtomicU64,
    frames: Mutex<Vec<Value>>,
    queries: Mutex<Vec<String>>,
    authorizations: Mutex<Vec<String>>,
    messages: Mutex<Vec<(String, Value)>>,
    channels: Mutex<HashMap<String, Value>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
}

impl GatewayState {
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn push(&self, frame: &Value) -> bool {
        let outbound = self.outbound.lock().unwrap();
        match outbound.as_ref() {
            Some(tx) => tx.send(Message::Text(frame.to_string())).is_ok(),
            None => false,
        }
    }
}

/// A gateway server on a local port
///
/// Frames received from the client are recorded; Identify is answered with
/// READY, Resume with RESUMED, and heartbeats with ACKs while auto-ack is on.
pub struct FakeGateway {
    state: Arc<GatewayState>,
    _handle: JoinHandle<()>,
}

impl FakeGateway {
    /// Start a fake gateway announcing `heartbeat_interval` milliseconds in Hello
    pub async fn start(heartbeat_interval: u64) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(GatewayState {
            addr,
            heartbeat_interval,
            auto_ack: AtomicBool::new(true),
            connections: AtomicUsize::new(0),
            sequence: AtomicU64::new(0),
            frames: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            authorizations: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            channels: Mutex::new(HashMap::new()),
            outbound: Mutex::new(None),
        });

        let app = Router::new()
            .route("/gateway/bot", get(gateway_bot))
            .route("/channels/:id", get(get_channel))
            .route("/channels/:id/messages", post(create_message))
            .route("/ws", get(gateway_socket))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            state,
            _handle: handle,
        })
    }

    /// Base URL of the request API
    pub fn base_url(&self) -> String {
        format!("http://{}", self.state.addr)
    }

    /// Stop answering heartbeats
    pub fn disable_acks(&self) {
        self.state.auto_ack.store(false, Ordering::SeqCst);
    }

    /// Serve a channel object from `GET /channels/{id}`
    pub fn add_channel(&self, id: u64, kind: u8, guild_id: Option<u64>) {
        let mut channel = json!({
            "id": id.to_string(),
            "type": kind,
            "name": format!("channel-{id}"),
        });
        if let Some(guild_id) = guild_id {
            channel["guild_id"] = json!(guild_id.to_string());
        }
        self.state
            .channels
            .lock()
            .unwrap()
            .insert(id.to_string(), channel);
    }

    /// Send a dispatch to the connected client; returns its sequence number
    pub fn dispatch(&self, event: &str, data: Value) -> u64 {
        let sequence = self.state.next_sequence();
        self.state
            .push(&json!({ "op": 0, "t": event, "s": sequence, "d": data }));
        sequence
    }

    /// Send a raw frame to the connected client
    pub fn send(&self, frame: Value) -> bool {
        self.state.push(&frame)
    }

    /// Close the current connection with a close code
    pub fn close(&self, code: u16, reason: &'static str) {
        let outbound = self.state.outbound.lock().unwrap();
        if let Some(tx) = outbound.as_ref() {
            let _ = tx.send(Message::Close(Some(CloseFrame {
                code,
                reason: reason.into(),
            })));
        }
    }

    /// Number of WebSocket connections accepted so far
    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// All frames received from clients, in arrival order
    pub fn frames(&self) -> Vec<Value> {
        self.state.frames.lock().unwrap().clone()
    }

    /// Received frames with the given opcode
    pub fn frames_with_op(&self, op: u64) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|frame| frame["op"].as_u64() == Some(op))
            .collect()
    }

    /// Query strings of WebSocket upgrade requests
    pub fn queries(&self) -> Vec<String> {
        self.state.queries.lock().unwrap().clone()
    }

    /// Authorization headers seen on gateway discovery
    pub fn authorizations(&self) -> Vec<String> {
        self.state.authorizations.lock().unwrap().clone()
    }

    /// Messages posted through the request API as (channel id, body)
    pub fn messages(&self) -> Vec<(String, Value)> {
        self.state.messages.lock().unwrap().clone()
    }

    /// Build a session wired to this gateway through the real request client
    /// and WebSocket transport
    pub fn session(&self) -> Result<(Session, GatewayClient)> {
        let rest = HttpRequestClient::new(self.base_url(), TOKEN, true, Duration::from_secs(5))?;
        Ok(Session::new(
            SessionConfig::new(TOKEN),
            Arc::new(rest),
            Arc::new(WebSocketTransport::new()),
        ))
    }

    /// Spawn a session and wait until it is active
    pub async fn connect(&self) -> Result<(GatewayClient, JoinHandle<()>)> {
        let (session, client) = self.session()?;
        let task = session.spawn().await?;
        wait_for_state(&client, ConnectionState::Active).await?;
        Ok((client, task))
    }
}

// ============================================================================
// Routes
// ============================================================================

async fn gateway_bot(State(state): State<Arc<GatewayState>>, headers: HeaderMap) -> Json<Value> {
    if let Some(auth) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        state.authorizations.lock().unwrap().push(auth.to_string());
    }
    Json(json!({ "url": format!("ws://{}/ws", state.addr), "shards": 1 }))
}

async fn get_channel(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    state
        .channels
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_message(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let created = json!({ "id": "9000", "channel_id": id, "content": body["content"] });
    state.messages.lock().unwrap().push((id, body));
    (StatusCode::OK, Json(created))
}

async fn gateway_socket(
    State(state): State<Arc<GatewayState>>,
    RawQuery(query): RawQuery,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    state.queries.lock().unwrap().push(query.unwrap_or_default());
    ws.on_upgrade(move |socket| serve_socket(state, socket))
}

async fn serve_socket(state: Arc<GatewayState>, socket: WebSocket) {
    state.connections.fetch_add(1, Ordering::SeqCst);

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    *state.outbound.lock().unwrap() = Some(tx.clone());

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sink.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    let hello = json!({ "op": 10, "d": { "heartbeat_interval": state.heartbeat_interval } });
    let _ = tx.send(Message::Text(hello.to_string()));

    while let Some(Ok(message)) = stream.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let Ok(frame) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        state.frames.lock().unwrap().push(frame.clone());

        let reply = match frame["op"].as_u64() {
            Some(1) if state.auto_ack.load(Ordering::SeqCst) => Some(json!({ "op": 11 })),
            Some(2) => Some(json!({
                "op": 0,
                "t": "READY",
                "s": state.next_sequence(),
                "d": {
                    "v": 10,
                    "user": { "id": BOT_USER_ID.to_string(), "username": "fake-bot", "bot": true },
                    "guilds": [],
                    "session_id": SESSION_ID,
                },
            })),
            Some(6) => Some(json!({
                "op": 0,
                "t": "RESUMED",
                "s": state.next_sequence(),
                "d": {},
            })),
            _ => None,
        };
        if let Some(reply) = reply {
            let _ = tx.send(Message::Text(reply.to_string()));
        }
    }

    writer.abort();
}

// ============================================================================
// Polling
// ============================================================================

/// Poll `condition` until it holds, failing after a few seconds
pub async fn wait_until<F>(mut condition: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    eventually(|| std::future::ready(condition())).await
}

/// Poll an async `probe` until it yields true, failing after a few seconds
pub async fn eventually<F, Fut>(mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    while !probe().await {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("condition not met within {WAIT_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

/// Wait until the session reports `expected`
pub async fn wait_for_state(client: &GatewayClient, expected: ConnectionState) -> Result<()> {
    eventually(|| async move { client.connection_state().await.ok() == Some(expected) }).await
}
