//! Dispatch event names
//!
//! Handlers are keyed by the normalized form of the `t` field, so
//! registrations may use any casing and spaces or dashes.

use std::fmt;
use std::str::FromStr;

/// Dispatch events with a built-in effect on session state
///
/// Every other event name is still delivered to registered handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    /// Identify accepted; carries the session id and current user
    Ready,
    /// Resume accepted
    Resumed,
    /// Guild became available or was joined
    GuildCreate,
    MessageCreate,
}

const NAMES: [(GatewayEventType, &str); 4] = [
    (GatewayEventType::Ready, "READY"),
    (GatewayEventType::Resumed, "RESUMED"),
    (GatewayEventType::GuildCreate, "GUILD_CREATE"),
    (GatewayEventType::MessageCreate, "MESSAGE_CREATE"),
];

impl GatewayEventType {
    /// Wire name as sent in `t`
    pub fn as_str(self) -> &'static str {
        NAMES
            .iter()
            .find(|(event, _)| *event == self)
            .map_or("", |(_, name)| *name)
    }

    /// Look up a name that is already normalized
    pub fn from_normalized(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(_, candidate)| *candidate == name)
            .map(|(event, _)| *event)
    }
}

impl FromStr for GatewayEventType {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_normalized(&normalize_event_name(s)).ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event name without built-in handling
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no built-in handling for event {0:?}")]
pub struct UnknownEvent(pub String);

/// Canonical form of an event name: trimmed, upper-cased, with spaces and
/// dashes replaced by underscores
///
/// `"message create"`, `"message-create"` and `"MESSAGE_CREATE"` all map to
/// the same handler slot.
#[must_use]
pub fn normalize_event_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '-' {
                '_'
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}
