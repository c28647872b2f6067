//! Duplex transport collaborator
//!
//! A transport opens a connection to a gateway URL, accepts outbound frames,
//! and reports inbound frames, end-of-stream and host-initiated disconnects
//! back to the session through an [`Inbound`] handle.

mod websocket;

pub use websocket::WebSocketTransport;

use crate::session::SessionEvent;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Transport error type
#[derive(Debug, Error)]
pub enum TransportError {
    /// WebSocket handshake or I/O failure
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// Write attempted on a closed connection
    #[error("Connection is closed")]
    Closed,
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(e))
    }
}

/// Notification raised by a live connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound text frame
    Data(String),
    /// The stream ended; no further events follow
    End,
    /// The remote host closed the connection
    HostDisconnect { code: Option<u16>, reason: String },
}

/// Sink for the notifications of one connection
///
/// Every event is tagged with the generation of the connection it belongs to,
/// so the session can ignore anything a replaced connection still reports.
#[derive(Debug, Clone)]
pub struct Inbound {
    generation: u64,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl Inbound {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the connection this handle reports for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report an inbound frame
    pub fn data(&self, frame: impl Into<String>) {
        self.emit(TransportEvent::Data(frame.into()));
    }

    /// Report end-of-stream
    pub fn end(&self) {
        self.emit(TransportEvent::End);
    }

    /// Report a close initiated by the remote host
    pub fn host_disconnect(&self, code: Option<u16>, reason: impl Into<String>) {
        self.emit(TransportEvent::HostDisconnect {
            code,
            reason: reason.into(),
        });
    }

    fn emit(&self, event: TransportEvent) {
        // The session may already be gone; nothing is listening then.
        let _ = self.tx.send(SessionEvent::Transport {
            generation: self.generation,
            event,
        });
    }
}

/// Factory for duplex connections
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection to `url`, reporting its events through `inbound`
    async fn connect(
        &self,
        url: &str,
        inbound: Inbound,
    ) -> Result<Box<dyn TransportConnection>, TransportError>;
}

/// One open duplex connection
#[async_trait]
pub trait TransportConnection: Send {
    /// Write one outbound text frame
    async fn write(&mut self, frame: String) -> Result<(), TransportError>;

    /// Close the connection; closing twice is a no-op
    async fn close(&mut self);

    /// Check whether frames can still be written
    fn is_open(&self) -> bool;
}
