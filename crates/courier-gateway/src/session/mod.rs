//! Gateway session
//!
//! The session is a single task consuming one event queue: transport
//! notifications, heartbeat ticks and commands from [`GatewayClient`] handles.
//! It owns the connection lifecycle, the sequence number and resume token, the
//! heartbeat timer, and the dispatch router.

mod heartbeat;
mod state;

pub use state::{ConnectionState, Invalidation, SessionCommand, SessionEvent, SessionSnapshot};

use crate::client::GatewayClient;
use crate::dispatch::{DispatchOutcome, DispatchRouter};
use crate::error::GatewayResult;
use crate::protocol::{
    describe_close, recovery_for, GatewayMessage, IdentifyPayload, IdentifyProperties, OpCode,
    Recovery, ResumePayload, StatusUpdatePayload,
};
use crate::rest::{self, RequestClient};
use crate::transport::{Inbound, Transport, TransportConnection, TransportEvent};
use courier_common::AppConfig;
use courier_core::GatewayIntents;
use heartbeat::HeartbeatTimer;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Library name reported in the Identify connection properties
const LIBRARY_NAME: &str = "courier";

/// Settings for one gateway session
#[derive(Clone)]
pub struct SessionConfig {
    pub token: String,
    /// Bot identities discover the gateway through `/gateway/bot`
    pub is_bot: bool,
    /// Gateway protocol version appended to the URL
    pub version: u8,
    pub intents: GatewayIntents,
    pub large_threshold: u32,
    pub properties: IdentifyProperties,
    pub command_prefix: char,
}

impl SessionConfig {
    /// Bot session with default settings
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            is_bot: true,
            version: 10,
            intents: GatewayIntents::default(),
            large_threshold: 100,
            properties: IdentifyProperties::for_library(LIBRARY_NAME),
            command_prefix: '!',
        }
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            token: config.bot.token.clone(),
            is_bot: config.bot.is_bot,
            version: config.gateway.version,
            intents: config.gateway.intents,
            large_threshold: config.gateway.large_threshold,
            properties: IdentifyProperties::for_library(LIBRARY_NAME),
            command_prefix: config.bot.command_prefix,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("token", &"<redacted>")
            .field("is_bot", &self.is_bot)
            .field("version", &self.version)
            .field("intents", &self.intents)
            .field("large_threshold", &self.large_threshold)
            .field("command_prefix", &self.command_prefix)
            .finish()
    }
}

/// Append the protocol query to a discovered gateway URL
fn gateway_url(base: &str, version: u8) -> String {
    let has_path = base
        .split_once("://")
        .is_some_and(|(_, rest)| rest.contains('/'));
    let separator = if has_path { "" } else { "/" };
    format!("{base}{separator}?v={version}&encoding=json")
}

/// One logical gateway session
pub struct Session {
    config: SessionConfig,
    rest: Arc<dyn RequestClient>,
    transport: Arc<dyn Transport>,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,

    /// Current connection; at most one exists at a time
    connection: Option<Box<dyn TransportConnection>>,
    /// Incremented per opened connection; events of older generations are ignored
    generation: u64,
    state: ConnectionState,

    session_id: Option<String>,
    last_sequence: Option<u64>,
    resuming: bool,
    heartbeat_acked: bool,
    heartbeat: HeartbeatTimer,
    last_invalidation: Option<Invalidation>,

    router: DispatchRouter,
}

impl Session {
    /// Create a session and the handle used to drive it
    ///
    /// Nothing is connected yet; call [`Session::connect`] and then run the
    /// session with [`Session::run`] (or use [`Session::spawn`]).
    pub fn new(
        config: SessionConfig,
        rest: Arc<dyn RequestClient>,
        transport: Arc<dyn Transport>,
    ) -> (Self, GatewayClient) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = GatewayClient::new(tx.clone(), rest.clone());
        let router = DispatchRouter::new(config.command_prefix);

        let session = Self {
            config,
            rest,
            transport,
            tx,
            rx,
            connection: None,
            generation: 0,
            state: ConnectionState::Disconnected,
            session_id: None,
            last_sequence: None,
            resuming: false,
            heartbeat_acked: true,
            heartbeat: HeartbeatTimer::default(),
            last_invalidation: None,
            router,
        };

        (session, client)
    }

    /// Connect and run the session on a new task
    pub async fn spawn(mut self) -> GatewayResult<JoinHandle<()>> {
        self.connect().await?;
        Ok(tokio::spawn(self.run()))
    }

    /// Process events until shutdown
    pub async fn run(mut self) {
        tracing::info!("Session task started");
        while let Some(event) = self.rx.recv().await {
            if self.handle_event(event).await.is_break() {
                break;
            }
        }
        tracing::info!("Session task stopped");
    }

    /// Discover the gateway and open a fresh transport
    ///
    /// Any previous transport is closed first, so at most one is ever live.
    pub async fn connect(&mut self) -> GatewayResult<()> {
        self.set_state(ConnectionState::Bootstrapping);

        let info = match rest::gateway_info(self.rest.as_ref(), self.config.is_bot).await {
            Ok(info) => info,
            Err(e) => {
                self.teardown().await;
                self.set_state(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };
        if let Some(shards) = info.shards {
            tracing::info!(shards, "Gateway recommended shard count");
        }

        let url = gateway_url(&info.url, self.config.version);
        self.teardown().await;

        self.set_state(ConnectionState::Connecting);
        self.generation += 1;
        let inbound = Inbound::new(self.generation, self.tx.clone());

        match self.transport.connect(&url, inbound).await {
            Ok(connection) => {
                tracing::info!(generation = self.generation, %url, "Gateway connected");
                self.connection = Some(connection);
                self.set_state(ConnectionState::AwaitingHello);
                Ok(())
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                Err(e.into())
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            session_id: self.session_id.clone(),
            last_sequence: self.last_sequence,
            resuming: self.resuming,
            heartbeat_acked: self.heartbeat_acked,
            last_invalidation: self.last_invalidation,
            guild_count: self.router.guild_count(),
        }
    }

    pub(crate) async fn handle_event(&mut self, event: SessionEvent) -> ControlFlow<()> {
        match event {
            SessionEvent::Transport { generation, event } => {
                self.on_transport_event(generation, event).await;
            }
            SessionEvent::HeartbeatTick { epoch } => self.on_heartbeat_tick(epoch).await,
            SessionEvent::Command(command) => return self.on_command(command).await,
        }
        ControlFlow::Continue(())
    }

    async fn on_transport_event(&mut self, generation: u64, event: TransportEvent) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Ignoring event from a replaced connection"
            );
            return;
        }

        match event {
            TransportEvent::Data(frame) => self.handle_frame(&frame).await,
            TransportEvent::End => {
                // No automatic reconnect on end-of-stream.
                self.heartbeat.cancel();
                self.connection = None;
                self.set_state(ConnectionState::Disconnected);
                tracing::info!(generation, "Gateway connection ended");
            }
            TransportEvent::HostDisconnect { code, reason } => match code {
                Some(code) => {
                    let recovery = recovery_for(code);
                    tracing::warn!(
                        code,
                        %reason,
                        description = %describe_close(code),
                        %recovery,
                        reconnectable = recovery != Recovery::Fatal,
                        "Gateway closed the connection"
                    );
                }
                None => tracing::warn!("Gateway closed the connection without a close code"),
            },
        }
    }

    /// Interpret one inbound frame
    ///
    /// Malformed frames are logged and dropped without touching any state.
    pub(crate) async fn handle_frame(&mut self, raw: &str) {
        let message = match GatewayMessage::from_json(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed frame");
                return;
            }
        };

        tracing::trace!(op = %message.op, "Frame received");

        match message.op {
            OpCode::Dispatch => self.handle_dispatch(message),
            OpCode::Heartbeat => self.send_heartbeat().await,
            OpCode::Reconnect => {
                tracing::info!("Gateway requested a reconnect");
                self.reconnect().await;
            }
            OpCode::InvalidSession => self.handle_invalid_session(&message).await,
            OpCode::Hello => match message.as_hello() {
                Some(hello) => {
                    self.handshake(Duration::from_millis(hello.heartbeat_interval))
                        .await;
                }
                None => tracing::warn!("Dropping Hello without a usable heartbeat interval"),
            },
            OpCode::HeartbeatAck => {
                tracing::trace!("Heartbeat acknowledged");
                self.heartbeat_acked = true;
            }
            other => tracing::debug!(op = %other, "Ignoring client-only op code from gateway"),
        }
    }

    fn handle_dispatch(&mut self, message: GatewayMessage) {
        if let Some(seq) = message.s {
            self.last_sequence = Some(seq);
        }
        if self.state == ConnectionState::Handshaking {
            self.set_state(ConnectionState::Active);
        }

        let Some(event_name) = message.t else {
            tracing::warn!(seq = ?message.s, "Dispatch without an event name");
            return;
        };
        tracing::debug!(event = %event_name, seq = ?message.s, "Dispatch received");

        match self.router.route(&event_name, message.d) {
            DispatchOutcome::Ready { session_id } => {
                tracing::debug!(%session_id, "Session established");
                self.session_id = Some(session_id);
            }
            DispatchOutcome::Resumed => {
                tracing::info!(seq = ?self.last_sequence, "Session resumed");
                self.resuming = false;
            }
            DispatchOutcome::None => {}
        }
    }

    async fn handle_invalid_session(&mut self, message: &GatewayMessage) {
        let invalidation =
            Invalidation::from_resumable(message.as_invalid_session().unwrap_or(false));
        tracing::warn!(?invalidation, "Gateway invalidated the session");

        // The connection stays stored until its end-of-stream arrives.
        if let Some(connection) = self.connection.as_mut() {
            connection.close().await;
        }

        if invalidation == Invalidation::NotResumable {
            self.session_id = None;
            self.last_sequence = None;
            self.resuming = false;
        }
        self.last_invalidation = Some(invalidation);
    }

    /// Arm the heartbeat and send Identify or Resume
    async fn handshake(&mut self, interval: Duration) {
        self.heartbeat.arm(interval, self.tx.clone());

        let message = if self.resuming {
            tracing::info!(seq = ?self.last_sequence, "Resuming session");
            GatewayMessage::resume(&ResumePayload {
                token: self.config.token.clone(),
                session_id: self.session_id.clone(),
                seq: self.last_sequence,
            })
        } else {
            tracing::info!(intents = %self.config.intents, "Identifying");
            GatewayMessage::identify(&IdentifyPayload {
                token: self.config.token.clone(),
                intents: self.config.intents,
                properties: self.config.properties.clone(),
                compress: false,
                large_threshold: self.config.large_threshold,
                presence: StatusUpdatePayload::default(),
            })
        };

        match message {
            Ok(message) => self.send(message).await,
            Err(e) => tracing::error!(error = %e, "Failed to encode handshake"),
        }
        self.set_state(ConnectionState::Handshaking);
    }

    /// Reconnect, resuming the stored session if there is one
    ///
    /// A session discarded by a non-resumable invalidation identifies afresh.
    async fn reconnect(&mut self) {
        self.resuming = self.session_id.is_some();
        self.heartbeat.cancel();
        self.heartbeat_acked = true;

        if let Err(e) = self.connect().await {
            tracing::error!(error = %e, "Reconnect failed");
            self.set_state(ConnectionState::Disconnected);
        }
    }

    async fn on_heartbeat_tick(&mut self, epoch: u64) {
        if !self.heartbeat.is_current(epoch) {
            tracing::trace!(epoch, "Ignoring tick from a cancelled timer");
            return;
        }

        if !self.heartbeat_acked {
            tracing::warn!(seq = ?self.last_sequence, "Heartbeat not acknowledged, reconnecting");
            self.reconnect().await;
            return;
        }

        self.send_heartbeat().await;
    }

    async fn send_heartbeat(&mut self) {
        self.heartbeat_acked = false;
        self.send(GatewayMessage::heartbeat(self.last_sequence)).await;
    }

    async fn on_command(&mut self, command: SessionCommand) -> ControlFlow<()> {
        match command {
            SessionCommand::Send(message) => self.send(message).await,
            SessionCommand::OnEvent { name, callback } => self.router.on_event(&name, callback),
            SessionCommand::RegisterCommand { word, callback } => {
                self.router.register_command(&word, callback);
            }
            SessionCommand::Reconnect => self.reconnect().await,
            SessionCommand::CurrentUser(reply) => {
                let _ = reply.send(self.router.current_user().cloned());
            }
            SessionCommand::Guild(id, reply) => {
                let _ = reply.send(self.router.guild(id).cloned());
            }
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => {
                self.shutdown().await;
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn shutdown(&mut self) {
        tracing::info!("Shutting down session");
        self.heartbeat.cancel();
        self.teardown().await;
        self.set_state(ConnectionState::Disconnected);
    }

    /// Close and drop the current connection, if any
    async fn teardown(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close().await;
        }
    }

    async fn send(&mut self, message: GatewayMessage) {
        let op = message.op;
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(%op, error = %e, "Failed to encode frame");
                return;
            }
        };

        let Some(connection) = self.connection.as_mut() else {
            tracing::warn!(%op, "Not connected, dropping outbound frame");
            return;
        };

        match connection.write(frame).await {
            Ok(()) => tracing::trace!(%op, "Frame sent"),
            Err(e) => tracing::warn!(%op, error = %e, "Failed to write frame"),
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            tracing::debug!(from = %self.state, to = %state, "Connection state changed");
            self.state = state;
        }
    }
}
