//! WebSocket transport: one long-lived bidirectional socket.
//!
//! A single background reader task is the sole consumer of the socket
//! stream. It forwards text frames to the inbound channel, answers pings,
//! and delivers a final [`InboundFrame::Closed`] with the close reason when
//! the peer hangs up or the stream errors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::{TransportError, TransportResult};
use crate::traits::{InboundFrame, Transport, TransportFactory, TransportKind};

/// Default port for the socket variant.
pub const DEFAULT_WS_PORT: u16 = 8765;

/// Write half of a connected socket.
type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Persistent bidirectional WebSocket transport.
pub struct WebSocketTransport {
    url: String,
    writer: Arc<Mutex<Option<WsSink>>>,
    inbound: Mutex<Option<mpsc::Receiver<InboundFrame>>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl WebSocketTransport {
    /// Create an unconnected transport for the given `ws://` URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            writer: Arc::new(Mutex::new(None)),
            inbound: Mutex::new(None),
            reader_task: Mutex::new(None),
        }
    }

    fn spawn_reader(
        &self,
        mut read: futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
        tx: mpsc::Sender<InboundFrame>,
    ) -> JoinHandle<()> {
        let writer = Arc::clone(&self.writer);
        let endpoint = self.url.clone();

        tokio::spawn(async move {
            let reason = loop {
                match read.next().await {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(InboundFrame::Text(text.to_string())).await.is_err() {
                            break "receiver dropped".to_string();
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Some(w) = writer.lock().await.as_mut() {
                            let _ = w.send(Message::Pong(data)).await;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        break frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty())
                            .unwrap_or_else(|| "closed by peer".to_string());
                    }
                    // Binary and pong frames are not part of this protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break e.to_string(),
                    None => break "connection closed".to_string(),
                }
            };
            tracing::debug!(endpoint = %endpoint, reason = %reason, "websocket reader finished");
            let _ = tx.send(InboundFrame::Closed { reason }).await;
        })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Socket
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn connect(&self) -> TransportResult<()> {
        url::Url::parse(&self.url)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {e}", self.url)))?;

        if self.writer.lock().await.is_some() {
            return Err(TransportError::ConnectFailed(
                "transport already open".to_string(),
            ));
        }

        let (stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;
        let (sink, read) = stream.split();

        let (tx, rx) = mpsc::channel(256);
        let task = self.spawn_reader(read, tx);

        *self.writer.lock().await = Some(sink);
        *self.inbound.lock().await = Some(rx);
        *self.reader_task.lock().await = Some(task);

        tracing::debug!(endpoint = %self.url, "websocket connected");
        Ok(())
    }

    async fn send(&self, frame: String) -> TransportResult<Option<String>> {
        match self.writer.lock().await.as_mut() {
            Some(w) => {
                w.send(Message::Text(frame.into()))
                    .await
                    .map_err(|e| TransportError::SendFailed(e.to_string()))?;
                Ok(None)
            }
            None => Err(TransportError::NotConnected),
        }
    }

    async fn receive(&self) -> Option<InboundFrame> {
        let mut guard = self.inbound.lock().await;
        match guard.as_mut() {
            Some(rx) => {
                let item = rx.recv().await;
                if item.is_none() {
                    *guard = None;
                }
                item
            }
            None => None,
        }
    }

    async fn close(&self) -> TransportResult<()> {
        if let Some(mut w) = self.writer.lock().await.take() {
            let _ = w.send(Message::Close(None)).await;
            let _ = w.close().await;
        }
        if let Some(task) = self.reader_task.lock().await.take() {
            task.abort();
        }
        Ok(())
    }
}

/// Builds [`WebSocketTransport`] handles for a fixed endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketFactory {
    url: String,
}

impl WebSocketFactory {
    /// Factory for `ws://<host>:<port>`.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            url: format!("ws://{host}:{port}"),
        }
    }

    /// Factory for an explicit URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl TransportFactory for WebSocketFactory {
    fn kind(&self) -> TransportKind {
        TransportKind::Socket
    }

    fn create(&self) -> TransportResult<Arc<dyn Transport>> {
        Ok(Arc::new(WebSocketTransport::new(self.url.clone())))
    }
}
