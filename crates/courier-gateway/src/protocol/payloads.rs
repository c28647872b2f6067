//! Payload definitions
//!
//! Structures carried in the `d` field of client and server messages.

use courier_core::{GatewayIntents, Snowflake};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Create a Hello payload with the given interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to start a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authentication token
    pub token: String,

    /// Event categories this session subscribes to
    pub intents: GatewayIntents,

    /// Client connection properties
    pub properties: IdentifyProperties,

    /// Whether the server may compress payloads
    pub compress: bool,

    /// Member count above which offline members are omitted from guild payloads
    pub large_threshold: u32,

    /// Initial presence
    pub presence: StatusUpdatePayload,
}

/// Client connection properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,

    /// Browser or library name
    pub browser: String,

    /// Device name
    pub device: String,
}

impl IdentifyProperties {
    /// Properties describing this library on the current platform
    #[must_use]
    pub fn for_library(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            os: std::env::consts::OS.to_string(),
            browser: name.clone(),
            device: name,
        }
    }
}

/// Online status shown to other users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Online,
    Idle,
    Dnd,
    Invisible,
    Offline,
}

impl PresenceStatus {
    /// Wire name of this status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Invisible => "invisible",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity type shown next to a presence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityKind {
    #[default]
    Playing,
    Streaming,
    Listening,
    Watching,
    Custom,
    Competing,
}

impl ActivityKind {
    /// Get the numeric value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Playing => 0,
            Self::Streaming => 1,
            Self::Listening => 2,
            Self::Watching => 3,
            Self::Custom => 4,
            Self::Competing => 5,
        }
    }

    /// Create from the numeric value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Playing),
            1 => Some(Self::Streaming),
            2 => Some(Self::Listening),
            3 => Some(Self::Watching),
            4 => Some(Self::Custom),
            5 => Some(Self::Competing),
            _ => None,
        }
    }
}

impl Serialize for ActivityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid activity type: {value}")))
    }
}

/// Activity attached to a presence update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    /// Stream URL, only meaningful for `Streaming`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Activity {
    /// A "Playing ..." activity
    #[must_use]
    pub fn playing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActivityKind::Playing,
            url: None,
        }
    }
}

/// Payload for op 3 (Status Update)
///
/// Also used as the initial presence inside Identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdatePayload {
    /// Unix time in milliseconds since the client went idle
    pub since: Option<u64>,

    /// Activity to display, null to clear
    pub activity: Option<Activity>,

    pub status: PresenceStatus,

    pub afk: bool,
}

impl Default for StatusUpdatePayload {
    fn default() -> Self {
        Self {
            since: None,
            activity: None,
            status: PresenceStatus::Online,
            afk: false,
        }
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to reattach to a dropped session. The session id and
/// sequence are sent as null when the client never received them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authentication token
    pub token: String,

    /// Session ID to resume
    pub session_id: Option<String>,

    /// Last received sequence number
    pub seq: Option<u64>,
}

/// Payload for op 4 (Voice State Update)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStateUpdatePayload {
    pub guild_id: Snowflake,

    /// Channel to join, null to leave voice in this guild
    pub channel_id: Option<Snowflake>,

    pub self_mute: bool,

    pub self_deaf: bool,
}

/// Payload for op 8 (Request Guild Members)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestGuildMembersPayload {
    pub guild_id: Snowflake,

    /// Username prefix to match, empty for all members
    pub query: String,

    /// Maximum members to return, 0 for no limit
    pub limit: u32,
}
