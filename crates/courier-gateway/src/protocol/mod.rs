//! Gateway protocol definitions
//!
//! Opcodes, the frame envelope, typed payloads for each client opcode, and
//! close codes.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{describe_close, recovery_for, CloseCode, Recovery};
pub use messages::GatewayMessage;
pub use opcodes::{Direction, OpCode};
pub use payloads::{
    Activity, ActivityKind, HelloPayload, IdentifyPayload, IdentifyProperties, PresenceStatus,
    RequestGuildMembersPayload, ResumePayload, StatusUpdatePayload, VoiceStateUpdatePayload,
};
