//! Gateway events
//!
//! Dispatch event names and the payloads the client decodes itself.

mod event_types;
mod payloads;

pub use event_types::{normalize_event_name, GatewayEventType, UnknownEvent};
pub use payloads::{MessageCreateEvent, ReadyEvent};
