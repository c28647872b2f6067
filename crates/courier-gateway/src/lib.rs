//! # courier-gateway
//!
//! Client-side session manager for the gateway protocol: connection
//! bootstrap, heartbeat liveness, identify-or-resume, and dispatch routing
//! including text commands.
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use courier_gateway::{HttpRequestClient, Session, SessionConfig, WebSocketTransport};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let rest = HttpRequestClient::new(
//!     "https://discord.com/api/v10",
//!     "token",
//!     true,
//!     Duration::from_secs(15),
//! )?;
//! let (session, client) = Session::new(
//!     SessionConfig::new("token"),
//!     Arc::new(rest),
//!     Arc::new(WebSocketTransport::new()),
//! );
//! client.register_command("ping", |_payload, _rest| println!("pong"))?;
//! let task = session.spawn().await?;
//! # let _ = task;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod transport;


pub use client::GatewayClient;
pub use dispatch::{CommandCallback, DispatchOutcome, DispatchRouter, EventCallback};
pub use error::{GatewayError, GatewayResult};
pub use events::{GatewayEventType, MessageCreateEvent, ReadyEvent, UnknownEvent};
pub use protocol::{
    Activity, ActivityKind, CloseCode, Direction, GatewayMessage, OpCode, PresenceStatus, Recovery,
};
pub use rest::{HttpRequestClient, RequestClient, RestError, RestResult};
pub use session::{ConnectionState, Invalidation, Session, SessionConfig, SessionSnapshot};
pub use transport::{Inbound, Transport, TransportConnection, TransportError, WebSocketTransport};
