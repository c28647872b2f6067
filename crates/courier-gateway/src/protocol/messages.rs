//! Gateway message format
//!
//! Defines the envelope for every WebSocket frame in either direction.

use super::{
    HelloPayload, IdentifyPayload, OpCode, RequestGuildMembersPayload, ResumePayload,
    StatusUpdatePayload, VoiceStateUpdatePayload,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message format
///
/// All messages sent over the WebSocket connection follow this format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload, null when absent
    #[serde(default)]
    pub d: Value,
}

impl GatewayMessage {
    /// Wrap an already-encoded payload
    #[must_use]
    pub fn new(op: OpCode, d: Value) -> Self {
        Self { op, t: None, s: None, d }
    }

    /// Encode a typed payload under the given op code
    pub fn with_payload<T: Serialize>(op: OpCode, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(op, serde_json::to_value(payload)?))
    }

    // === Client Messages ===

    /// Create a Heartbeat message (op=1)
    ///
    /// Carries the last received sequence, or null before the first dispatch.
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self::new(
            OpCode::Heartbeat,
            last_sequence.map_or(Value::Null, |s| Value::Number(s.into())),
        )
    }

    /// Create an Identify message (op=2)
    pub fn identify(payload: &IdentifyPayload) -> Result<Self, serde_json::Error> {
        Self::with_payload(OpCode::Identify, payload)
    }

    /// Create a Status Update message (op=3)
    pub fn status_update(payload: &StatusUpdatePayload) -> Result<Self, serde_json::Error> {
        Self::with_payload(OpCode::StatusUpdate, payload)
    }

    /// Create a Voice State Update message (op=4)
    pub fn voice_state_update(
        payload: &VoiceStateUpdatePayload,
    ) -> Result<Self, serde_json::Error> {
        Self::with_payload(OpCode::VoiceStateUpdate, payload)
    }

    /// Create a Resume message (op=6)
    pub fn resume(payload: &ResumePayload) -> Result<Self, serde_json::Error> {
        Self::with_payload(OpCode::Resume, payload)
    }

    /// Create a Request Guild Members message (op=8)
    pub fn request_guild_members(
        payload: &RequestGuildMembersPayload,
    ) -> Result<Self, serde_json::Error> {
        Self::with_payload(OpCode::RequestGuildMembers, payload)
    }

    // === Server Messages ===

    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: data,
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(heartbeat_interval: u64) -> Self {
        Self::new(
            OpCode::Hello,
            serde_json::json!({ "heartbeat_interval": heartbeat_interval }),
        )
    }

    // === Parsing Server Messages ===

    /// Try to parse as a Hello payload (op=10)
    ///
    /// A missing or zero interval is treated as malformed.
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.decode::<HelloPayload>()
            .filter(|hello| hello.heartbeat_interval > 0)
    }

    /// Try to parse the resumable flag of an Invalid Session message (op=9)
    ///
    /// Anything other than a literal `true` counts as not resumable.
    pub fn as_invalid_session(&self) -> Option<bool> {
        if self.op != OpCode::InvalidSession {
            return None;
        }
        Some(self.d.as_bool().unwrap_or(false))
    }

    /// Decode the data payload into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(&self.d).ok()
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}
