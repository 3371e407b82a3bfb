//! Client transports for the automcp session engine.
//!
//! Two interchangeable ways of moving text frames to and from a device
//! agent:
//!
//! - [`WebSocketTransport`] — one long-lived bidirectional socket. Replies
//!   arrive interleaved with notifications on the inbound stream.
//! - [`SseTransport`] — a one-way server-push event stream (GET) paired with
//!   discrete outbound POSTs. Each POST's HTTP response body is itself a
//!   protocol response, coupled to the request at the HTTP layer.
//!
//! Both expose the same [`Transport`] contract: `connect`, `send` one frame,
//! a push stream of inbound frames via `receive`, and an idempotent `close`.
//! Neither variant reconnects on its own; recovery is the session's job.

pub mod error;
pub mod sse;
pub mod traits;
pub mod websocket;

pub use error::{TransportError, TransportResult};
pub use sse::{SseFactory, SseTransport};
pub use traits::{InboundFrame, Transport, TransportFactory, TransportKind};
pub use websocket::{WebSocketFactory, WebSocketTransport};
