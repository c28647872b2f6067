//! Entity snapshots pushed by the gateway or returned by the request API

mod channel;
mod guild;
mod user;

pub use channel::{Channel, ChannelType};
pub use guild::{Guild, UnavailableGuild};
pub use user::User;
