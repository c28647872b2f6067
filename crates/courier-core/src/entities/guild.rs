//! Guild entity - a server the session's user belongs to

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Channel;
use crate::value_objects::Snowflake;

/// Guild snapshot from a GUILD_CREATE dispatch
///
/// The gateway representation is richer than what the request API returns,
/// so fields this type does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Guild {
    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Look up a channel of this guild by id
    pub fn channel(&self, channel_id: Snowflake) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }
}

/// Guild placeholder listed in READY before its GUILD_CREATE arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}
