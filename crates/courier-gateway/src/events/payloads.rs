//! Event payload definitions
//!
//! Typed views of the dispatch payloads the client reacts to itself.

use courier_core::{Snowflake, UnavailableGuild, User};
use serde::{Deserialize, Serialize};

// === Connection Events ===

/// READY event payload
///
/// Sent after successful Identify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    #[serde(default)]
    pub v: u8,

    /// Current user
    pub user: User,

    /// Guilds the user is in (initially unavailable)
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL for resuming (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,
}

// === Message Events ===

/// MESSAGE_CREATE event payload
///
/// Only the fields the command parser and replies need. `content` is empty
/// when the session lacks the message content intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default)]
    pub content: String,
}
