//! # courier-core
//!
//! Domain types for the gateway client: snowflake ids, intent flags, and the
//! user, guild, and channel snapshots pushed by the service.
//! This crate has no dependency on networking or the async runtime.

pub mod entities;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Channel, ChannelType, Guild, UnavailableGuild, User};
pub use value_objects::{GatewayIntents, Snowflake, SnowflakeParseError};
