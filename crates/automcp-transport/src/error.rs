//! Transport error types.

use thiserror::Error;

/// A specialized `Result` type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors surfaced by transport operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum TransportError {
    /// Failed to establish a connection (refused, unreachable, or a
    /// protocol-level failure during the connect handshake).
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// An established connection was lost.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Failed to send a frame.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// An HTTP endpoint answered with a non-success status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The transport has no open channel to send on.
    #[error("not connected")]
    NotConnected,

    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// An underlying I/O error occurred.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
