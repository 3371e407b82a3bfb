//! Client configuration.

use std::time::Duration;

use automcp_protocol::ClientInfo;
use automcp_transport::{
    SseFactory, TransportFactory, TransportKind, WebSocketFactory,
    sse::DEFAULT_HTTP_PORT, websocket::DEFAULT_WS_PORT,
};

/// Default fixed interval between reconnect attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Configuration of a [`Client`](crate::Client).
///
/// Only the host is required; everything else has the documented defaults.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Device agent host.
    pub host: String,
    /// Port of the WebSocket endpoint (socket variant).
    pub ws_port: u16,
    /// Port of the HTTP endpoint (stream variant).
    pub http_port: u16,
    /// Which transport variant to use.
    pub transport: TransportKind,
    /// Whether to schedule a reconnect after an unexpected closure.
    pub auto_reconnect: bool,
    /// Fixed interval between reconnect attempts.
    pub reconnect_interval: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Identity sent during the handshake.
    pub client_info: ClientInfo,
}

impl ClientConfig {
    /// Configuration for the given host with all defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ws_port: DEFAULT_WS_PORT,
            http_port: DEFAULT_HTTP_PORT,
            transport: TransportKind::Socket,
            auto_reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client_info: ClientInfo::default(),
        }
    }

    /// Set the WebSocket port.
    pub fn with_ws_port(mut self, port: u16) -> Self {
        self.ws_port = port;
        self
    }

    /// Set the HTTP port.
    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Select the transport variant.
    pub fn with_transport(mut self, kind: TransportKind) -> Self {
        self.transport = kind;
        self
    }

    /// Enable or disable automatic reconnection.
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Set the reconnect interval.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the client identity sent during the handshake.
    pub fn with_client_info(mut self, info: ClientInfo) -> Self {
        self.client_info = info;
        self
    }

    /// The factory for the configured transport variant.
    pub(crate) fn build_factory(&self) -> Box<dyn TransportFactory> {
        match self.transport {
            TransportKind::Socket => Box::new(WebSocketFactory::new(&self.host, self.ws_port)),
            TransportKind::Stream => Box::new(SseFactory::new(&self.host, self.http_port)),
        }
    }
}
