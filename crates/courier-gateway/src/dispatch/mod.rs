//! Dispatch event routing
//!
//! Registries for event and command callbacks, the command parser, and the
//! router tying them to the cached session state.

mod command;
mod registry;
mod router;

pub use command::{parse_command, ParsedCommand};
pub use registry::{CommandCallback, CommandRegistry, DispatchRegistry, EventCallback};
pub use router::{DispatchOutcome, DispatchRouter};
