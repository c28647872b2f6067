//! Gateway error types

use crate::rest::RestError;
use crate::transport::TransportError;
use thiserror::Error;

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request API call failed
    #[error("Request failed: {0}")]
    Rest(#[from] RestError),

    /// Duplex transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Outbound payload could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The session task has stopped and no longer accepts commands
    #[error("Session closed")]
    SessionClosed,
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
