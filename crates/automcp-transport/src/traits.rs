//! The transport contract.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportResult;

/// Which of the two transport variants a handle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Persistent bidirectional WebSocket.
    Socket,
    /// Server-push SSE stream plus discrete outbound POSTs.
    Stream,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socket => write!(f, "socket"),
            Self::Stream => write!(f, "stream"),
        }
    }
}

/// An item delivered on a transport's inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A text frame from the peer.
    Text(String),
    /// The channel closed. Delivered at most once, after which `receive`
    /// returns `None`.
    Closed {
        /// Why the channel closed, as reported by the peer or the stack.
        reason: String,
    },
}

/// A channel that carries discrete text frames to and from the peer.
///
/// Implementations do not reconnect on their own: once `Closed` has been
/// delivered the handle is spent, and the session builds a fresh one via its
/// [`TransportFactory`].
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Which variant this is.
    fn kind(&self) -> TransportKind;

    /// The endpoint this transport talks to, for diagnostics.
    fn endpoint(&self) -> String;

    /// Establish the underlying channel.
    ///
    /// Resolves once the channel is ready to carry frames; fails with a
    /// [`TransportError`](crate::TransportError) when the peer is refused,
    /// unreachable, or rejects the connect handshake.
    async fn connect(&self) -> TransportResult<()>;

    /// Send one text frame.
    ///
    /// The socket variant returns `Ok(None)`: its replies arrive on the
    /// inbound stream. The stream variant returns `Ok(Some(body))` — the
    /// POST's HTTP response body is itself the protocol response, and the
    /// caller must route it straight to the waiting request rather than
    /// through inbound routing.
    async fn send(&self, frame: String) -> TransportResult<Option<String>>;

    /// Await the next inbound frame.
    ///
    /// Returns `None` once the inbound stream is exhausted (after `Closed`
    /// was delivered, or after `close`). Intended for a single consumer: the
    /// session's router task.
    async fn receive(&self) -> Option<InboundFrame>;

    /// Tear the channel down. Idempotent; safe to call when never opened.
    async fn close(&self) -> TransportResult<()>;
}

/// Builds a fresh [`Transport`] per connect attempt.
///
/// The session holds a factory rather than a transport so every reconnect
/// gets a clean handle, and so tests can substitute a scripted transport.
pub trait TransportFactory: Send + Sync + fmt::Debug {
    /// Which variant this factory produces.
    fn kind(&self) -> TransportKind;

    /// Create a new, unconnected transport.
    fn create(&self) -> TransportResult<Arc<dyn Transport>>;
}
