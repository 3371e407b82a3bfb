//! SSE transport: a one-way server-push stream plus discrete POSTs.
//!
//! Inbound frames arrive as `data:` payloads on a `text/event-stream` GET to
//! the events path. Outbound frames are independent POSTs to the message
//! path; each POST's HTTP response body is itself the protocol response, so
//! [`Transport::send`] returns it for the caller to route directly to the
//! waiting request.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::error::{TransportError, TransportResult};
use crate::traits::{InboundFrame, Transport, TransportFactory, TransportKind};

/// Default port for the stream variant.
pub const DEFAULT_HTTP_PORT: u16 = 8766;

/// Path of the server-push event stream.
pub const EVENTS_PATH: &str = "/mcp/events";

/// Path outbound requests are POSTed to.
pub const MESSAGE_PATH: &str = "/mcp/message";

/// Extract the data payload of one SSE event block.
///
/// `data:` lines are collected and joined; `event:`/`id:` fields and comment
/// lines are ignored. Returns `None` for events with no data (keep-alives).
fn parse_sse_event(event: &str) -> Option<String> {
    let mut data: Vec<&str> = Vec::new();
    for line in event.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

/// Server-push SSE stream paired with discrete outbound POSTs.
pub struct SseTransport {
    events_url: String,
    message_url: String,
    http: reqwest::Client,
    inbound: Mutex<Option<mpsc::Receiver<InboundFrame>>>,
    stream_task: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for SseTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseTransport")
            .field("events_url", &self.events_url)
            .field("message_url", &self.message_url)
            .finish_non_exhaustive()
    }
}

impl SseTransport {
    /// Create an unconnected transport for explicit event and message URLs.
    pub fn new(events_url: impl Into<String>, message_url: impl Into<String>) -> Self {
        Self {
            events_url: events_url.into(),
            message_url: message_url.into(),
            http: reqwest::Client::new(),
            inbound: Mutex::new(None),
            stream_task: Mutex::new(None),
        }
    }

    fn spawn_stream_reader(
        &self,
        response: reqwest::Response,
        tx: mpsc::Sender<InboundFrame>,
    ) -> JoinHandle<()> {
        let endpoint = self.events_url.clone();

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            let reason = 'read: loop {
                match stream.next().await {
                    Some(Ok(chunk)) => {
                        buffer.push_str(&String::from_utf8_lossy(&chunk));
                        while let Some(pos) = buffer.find("\n\n") {
                            let event = buffer[..pos].to_string();
                            buffer = buffer[pos + 2..].to_string();
                            if let Some(data) = parse_sse_event(&event)
                                && tx.send(InboundFrame::Text(data)).await.is_err()
                            {
                                break 'read "receiver dropped".to_string();
                            }
                        }
                    }
                    Some(Err(e)) => break e.to_string(),
                    None => break "event stream ended".to_string(),
                }
            };
            tracing::debug!(endpoint = %endpoint, reason = %reason, "sse reader finished");
            let _ = tx.send(InboundFrame::Closed { reason }).await;
        })
    }
}

#[async_trait]
impl Transport for SseTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    fn endpoint(&self) -> String {
        self.events_url.clone()
    }

    async fn connect(&self) -> TransportResult<()> {
        url::Url::parse(&self.events_url)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {e}", self.events_url)))?;

        if self.stream_task.lock().await.is_some() {
            return Err(TransportError::ConnectFailed(
                "transport already open".to_string(),
            ));
        }

        let response = self
            .http
            .get(&self.events_url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::HttpStatus(response.status().as_u16()));
        }

        let (tx, rx) = mpsc::channel(256);
        let task = self.spawn_stream_reader(response, tx);

        *self.inbound.lock().await = Some(rx);
        *self.stream_task.lock().await = Some(task);

        tracing::debug!(endpoint = %self.events_url, "sse stream connected");
        Ok(())
    }

    async fn send(&self, frame: String) -> TransportResult<Option<String>> {
        let response = self
            .http
            .post(&self.message_url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(frame)
            .send()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::HttpStatus(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        Ok(Some(body))
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
        if let Some(task) = self.stream_task.lock().await.take() {
            task.abort();
        }
        Ok(())
    }
}

/// Builds [`SseTransport`] handles for a fixed endpoint pair.
#[derive(Debug, Clone)]
pub struct SseFactory {
    events_url: String,
    message_url: String,
}

impl SseFactory {
    /// Factory for `http://<host>:<port>` with the standard paths.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            events_url: format!("http://{host}:{port}{EVENTS_PATH}"),
            message_url: format!("http://{host}:{port}{MESSAGE_PATH}"),
        }
    }

    /// Factory for explicit event and message URLs.
    pub fn from_urls(events_url: impl Into<String>, message_url: impl Into<String>) -> Self {
        Self {
            events_url: events_url.into(),
            message_url: message_url.into(),
        }
    }
}

impl TransportFactory for SseFactory {
    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    fn create(&self) -> TransportResult<Arc<dyn Transport>> {
        Ok(Arc::new(SseTransport::new(
            self.events_url.clone(),
            self.message_url.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_event_single_data_line() {
        assert_eq!(
            parse_sse_event("data: {\"jsonrpc\":\"2.0\"}").as_deref(),
            Some("{\"jsonrpc\":\"2.0\"}")
        );
    }

    #[test]
    fn parse_event_joins_multiple_data_lines() {
        assert_eq!(
            parse_sse_event("data: line one\ndata: line two").as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn parse_event_ignores_fields_and_comments() {
        let event = ": keep-alive\nevent: message\nid: 42\ndata: payload";
        assert_eq!(parse_sse_event(event).as_deref(), Some("payload"));
    }

    #[test]
    fn parse_event_without_data_is_none() {
        assert_eq!(parse_sse_event(": keep-alive"), None);
        assert_eq!(parse_sse_event("event: ping\nid: 7"), None);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_safe_without_open() {
        let transport = SseTransport::new(
            "http://127.0.0.1:8766/mcp/events",
            "http://127.0.0.1:8766/mcp/message",
        );
        assert!(transport.close().await.is_ok());
        assert!(transport.close().await.is_ok());
    }

    #[test]
    fn factory_builds_standard_paths() {
        let factory = SseFactory::new("127.0.0.1", DEFAULT_HTTP_PORT);
        assert_eq!(factory.kind(), TransportKind::Stream);
        let transport = factory.create().unwrap();
        assert_eq!(transport.endpoint(), "http://127.0.0.1:8766/mcp/events");
    }
}
