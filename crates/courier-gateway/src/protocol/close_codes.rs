//! Gateway close codes
//!
//! The session never reconnects by itself after the host closes the
//! connection; the classification here only drives what gets logged and what
//! a caller can expect from a manual reconnect.

use std::fmt;

/// What a later reconnect can do after a given close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// The stored session survives and can be resumed
    Resume,
    /// The session is gone; only a fresh Identify will work
    Identify,
    /// Reconnecting with the same settings will be rejected again
    Fatal,
}

impl Recovery {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Identify => "identify",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level close codes (4000-4014, 4006 is unassigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    NotAuthenticated = 4003,
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    InvalidSeq = 4007,
    RateLimited = 4008,
    SessionTimedOut = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    InvalidApiVersion = 4012,
    InvalidIntents = 4013,
    DisallowedIntents = 4014,
}

/// (code, variant, description)
const TABLE: [(u16, CloseCode, &str); 14] = [
    (4000, CloseCode::UnknownError, "Unknown error"),
    (4001, CloseCode::UnknownOpcode, "Unknown opcode sent"),
    (4002, CloseCode::DecodeError, "Invalid payload sent"),
    (4003, CloseCode::NotAuthenticated, "Payload sent before identifying"),
    (4004, CloseCode::AuthenticationFailed, "Invalid token"),
    (4005, CloseCode::AlreadyAuthenticated, "Identified more than once"),
    (4007, CloseCode::InvalidSeq, "Invalid sequence on resume"),
    (4008, CloseCode::RateLimited, "Sending too fast"),
    (4009, CloseCode::SessionTimedOut, "Session timed out"),
    (4010, CloseCode::InvalidShard, "Invalid shard"),
    (4011, CloseCode::ShardingRequired, "Sharding required"),
    (4012, CloseCode::InvalidApiVersion, "Invalid gateway version"),
    (4013, CloseCode::InvalidIntents, "Invalid intents"),
    (4014, CloseCode::DisallowedIntents, "Disallowed intents"),
];

impl CloseCode {
    pub fn from_u16(code: u16) -> Option<Self> {
        TABLE
            .iter()
            .find(|(value, _, _)| *value == code)
            .map(|(_, close, _)| *close)
    }

    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn description(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, close, _)| *close == self)
            .map_or("Unknown error", |(_, _, text)| *text)
    }

    pub const fn recovery(self) -> Recovery {
        match self {
            Self::InvalidSeq | Self::SessionTimedOut => Recovery::Identify,
            Self::AuthenticationFailed
            | Self::InvalidShard
            | Self::ShardingRequired
            | Self::InvalidApiVersion
            | Self::InvalidIntents
            | Self::DisallowedIntents => Recovery::Fatal,
            _ => Recovery::Resume,
        }
    }

    /// Whether any reconnect can succeed
    pub const fn should_reconnect(self) -> bool {
        !matches!(self.recovery(), Recovery::Fatal)
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

/// Recovery for any close code
///
/// Normal closures (1000, 1001) end the session; anything unrecognized is
/// assumed resumable.
pub fn recovery_for(code: u16) -> Recovery {
    match code {
        1000 | 1001 => Recovery::Identify,
        _ => CloseCode::from_u16(code).map_or(Recovery::Resume, CloseCode::recovery),
    }
}

/// Human-readable description of any close code, known or not
pub fn describe_close(code: u16) -> String {
    match CloseCode::from_u16(code) {
        Some(known) => known.to_string(),
        None => format!("unrecognized close code {code}"),
    }
}
