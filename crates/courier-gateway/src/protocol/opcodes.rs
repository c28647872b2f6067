//! Gateway operation codes
//!
//! The numeric values are part of the wire contract and are serialized as a
//! bare integer in the `op` field.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which side of the connection may send an op code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Sent by the client only
    Client,
    /// Sent by the gateway only
    Server,
    /// Sent by either side (Heartbeat)
    Both,
}

/// Gateway operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// A named event; carries `t` and `s`
    Dispatch = 0,
    /// Liveness ping, carrying the last sequence number
    Heartbeat = 1,
    /// Start a new session
    Identify = 2,
    /// Update presence
    StatusUpdate = 3,
    /// Join, move, or leave a voice channel
    VoiceStateUpdate = 4,
    VoiceServerPing = 5,
    /// Reattach to a dropped session
    Resume = 6,
    /// The gateway asks for a reconnect and resume
    Reconnect = 7,
    /// Ask for a member chunk of a guild
    RequestGuildMembers = 8,
    /// The session was invalidated; `d` says whether it can be resumed
    InvalidSession = 9,
    /// First frame on a connection, carrying the heartbeat interval
    Hello = 10,
    HeartbeatAck = 11,
}

/// Every op code, indexed by its wire value
const ALL: [OpCode; 12] = [
    OpCode::Dispatch,
    OpCode::Heartbeat,
    OpCode::Identify,
    OpCode::StatusUpdate,
    OpCode::VoiceStateUpdate,
    OpCode::VoiceServerPing,
    OpCode::Resume,
    OpCode::Reconnect,
    OpCode::RequestGuildMembers,
    OpCode::InvalidSession,
    OpCode::Hello,
    OpCode::HeartbeatAck,
];

impl OpCode {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        ALL.get(usize::from(value)).copied()
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Heartbeat => Direction::Both,
            Self::Dispatch
            | Self::Reconnect
            | Self::InvalidSession
            | Self::Hello
            | Self::HeartbeatAck => Direction::Server,
            _ => Direction::Client,
        }
    }

    /// Check if the client may send this op code
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        !matches!(self.direction(), Direction::Server)
    }

    /// Check if the gateway may send this op code
    #[must_use]
    pub const fn is_server_op(self) -> bool {
        !matches!(self.direction(), Direction::Client)
    }

    /// Display name used in logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::StatusUpdate => "Status Update",
            Self::VoiceStateUpdate => "Voice State Update",
            Self::VoiceServerPing => "Voice Server Ping",
            Self::Resume => "Resume",
            Self::Reconnect => "Reconnect",
            Self::RequestGuildMembers => "Request Guild Members",
            Self::InvalidSession => "Invalid Session",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "Heartbeat ACK",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown op code {value}")))
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
