//! Session state and the messages driving the session task

use crate::dispatch::{CommandCallback, EventCallback};
use crate::protocol::GatewayMessage;
use crate::transport::TransportEvent;
use courier_core::{Guild, Snowflake, User};
use std::fmt;
use tokio::sync::oneshot;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No live connection
    #[default]
    Disconnected,
    /// Discovering the gateway URL
    Bootstrapping,
    /// Opening the transport
    Connecting,
    /// Transport open, waiting for Hello
    AwaitingHello,
    /// Identify or Resume sent
    Handshaking,
    /// Dispatch events are flowing
    Active,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Bootstrapping => "bootstrapping",
            Self::Connecting => "connecting",
            Self::AwaitingHello => "awaiting_hello",
            Self::Handshaking => "handshaking",
            Self::Active => "active",
        }
    }

    /// Check if a transport is expected to be open in this state
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::AwaitingHello | Self::Handshaking | Self::Active)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a server-signaled Invalid Session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// The stored session may still be resumed
    Resumable,
    /// The stored session is gone; the next handshake must identify
    NotResumable,
}

impl Invalidation {
    #[must_use]
    pub const fn from_resumable(resumable: bool) -> Self {
        if resumable {
            Self::Resumable
        } else {
            Self::NotResumable
        }
    }
}

/// Point-in-time view of the session fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: ConnectionState,
    pub session_id: Option<String>,
    pub last_sequence: Option<u64>,
    pub resuming: bool,
    pub heartbeat_acked: bool,
    pub last_invalidation: Option<Invalidation>,
    pub guild_count: usize,
}

/// Everything the session task reacts to, in arrival order
pub enum SessionEvent {
    /// Notification from the connection of the given generation
    Transport { generation: u64, event: TransportEvent },
    /// Heartbeat timer tick from the timer of the given epoch
    HeartbeatTick { epoch: u64 },
    /// Request from a client handle
    Command(SessionCommand),
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { generation, event } => f
                .debug_struct("Transport")
                .field("generation", generation)
                .field("event", event)
                .finish(),
            Self::HeartbeatTick { epoch } => {
                f.debug_struct("HeartbeatTick").field("epoch", epoch).finish()
            }
            Self::Command(command) => f.debug_tuple("Command").field(command).finish(),
        }
    }
}

/// Requests a client handle can make of the session task
pub enum SessionCommand {
    /// Write a frame on the current connection
    Send(GatewayMessage),
    OnEvent {
        name: String,
        callback: EventCallback,
    },
    RegisterCommand {
        word: String,
        callback: CommandCallback,
    },
    /// Reconnect and resume
    Reconnect,
    CurrentUser(oneshot::Sender<Option<User>>),
    Guild(Snowflake, oneshot::Sender<Option<Guild>>),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Stop the timer, close the transport and end the task
    Shutdown,
}

impl fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send(message) => f.debug_tuple("Send").field(&message.op).finish(),
            Self::OnEvent { name, .. } => f.debug_struct("OnEvent").field("name", name).finish(),
            Self::RegisterCommand { word, .. } => {
                f.debug_struct("RegisterCommand").field("word", word).finish()
            }
            Self::Reconnect => f.write_str("Reconnect"),
            Self::CurrentUser(_) => f.write_str("CurrentUser"),
            Self::Guild(id, _) => f.debug_tuple("Guild").field(id).finish(),
            Self::Snapshot(_) => f.write_str("Snapshot"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
