//! WebSocket transport built on tokio-tungstenite

use super::{Inbound, Transport, TransportConnection, TransportError};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport opening `ws://` and `wss://` connections
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(
        &self,
        url: &str,
        inbound: Inbound,
    ) -> Result<Box<dyn TransportConnection>, TransportError> {
        let (socket, _response) = tokio_tungstenite::connect_async(url).await?;
        tracing::debug!(generation = inbound.generation(), "WebSocket connection established");

        let (sink, stream) = socket.split();

        // Set once the client starts closing, so the echoed close frame is not
        // reported as a host disconnect.
        let closing = Arc::new(AtomicBool::new(false));
        let open = Arc::new(AtomicBool::new(true));

        let reader = tokio::spawn(read_loop(stream, inbound, closing.clone(), open.clone()));

        Ok(Box::new(WebSocketConnection {
            sink,
            reader,
            closing,
            open,
        }))
    }
}

/// Forward inbound frames until the stream ends
async fn read_loop(
    mut stream: SplitStream<Socket>,
    inbound: Inbound,
    closing: Arc<AtomicBool>,
    open: Arc<AtomicBool>,
) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => inbound.data(text),
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => inbound.data(text),
                Err(_) => tracing::debug!("Dropping non UTF-8 binary frame"),
            },
            Ok(Message::Close(frame)) => {
                if !closing.load(Ordering::SeqCst) {
                    match frame {
                        Some(frame) => {
                            inbound.host_disconnect(Some(u16::from(frame.code)), frame.reason);
                        }
                        None => inbound.host_disconnect(None, String::new()),
                    }
                }
                break;
            }
            // Ping/Pong are answered by tungstenite
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    open.store(false, Ordering::SeqCst);
    inbound.end();
}

struct WebSocketConnection {
    sink: SplitSink<Socket, Message>,
    reader: JoinHandle<()>,
    closing: Arc<AtomicBool>,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl TransportConnection for WebSocketConnection {
    async fn write(&mut self, frame: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        self.sink.send(Message::Text(frame)).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.sink.close().await {
            tracing::debug!(error = %e, "WebSocket close handshake failed");
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.closing.load(Ordering::SeqCst)
    }
}

impl Drop for WebSocketConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
