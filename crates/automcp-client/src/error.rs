//! Client error taxonomy.
//!
//! Four families, mirroring where a failure originates: transport faults
//! (connect/send), protocol faults (a server `error` envelope), timeouts,
//! and session precondition failures ("not connected", "already connected",
//! "client disconnected").

use serde_json::Value;
use thiserror::Error;

use automcp_protocol::JsonRpcError;
use automcp_transport::TransportError;

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by session and request operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ClientError {
    /// A transport-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with an `error` envelope.
    #[error("server error {code}: {message}")]
    Protocol {
        /// Server-supplied error code.
        code: i64,
        /// Server-supplied message.
        message: String,
        /// Optional structured detail.
        data: Option<Value>,
    },

    /// No response arrived within the configured window. The transport
    /// stays open; only this request fails.
    #[error("request timed out")]
    Timeout,

    /// A request was issued with no transport present.
    #[error("not connected")]
    NotConnected,

    /// `connect()` was called on an already connected session.
    #[error("already connected")]
    AlreadyConnected,

    /// `connect()` was called while another connect attempt is running.
    #[error("connection already in progress")]
    ConnectInProgress,

    /// The session was torn down while the request was outstanding.
    #[error("client disconnected")]
    Disconnected,

    /// The handshake round-trip produced an unusable result.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Lift a server `error` envelope into the client taxonomy.
    pub(crate) fn from_rpc(err: JsonRpcError) -> Self {
        Self::Protocol {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
