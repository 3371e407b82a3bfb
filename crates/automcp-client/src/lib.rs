//! MCP session engine for remote device automation.
//!
//! A [`Client`] owns one connection to a device agent: it opens a transport
//! (WebSocket by default, SSE+POST as the alternative), performs the
//! `initialize` handshake, correlates requests with responses by id, routes
//! unsolicited notifications to observers, and recovers from transport loss
//! by scheduling reconnects at a fixed interval.
//!
//! ```rust,no_run
//! use automcp_client::{Client, ClientConfig};
//!
//! # async fn example() -> automcp_client::Result<()> {
//! let client = Client::new(ClientConfig::new("192.168.1.20"));
//! client.on_notification(|method, _params| {
//!     println!("notification: {method}");
//! });
//!
//! let session = client.connect().await?;
//! println!("connected to {}", session.server_info.name);
//!
//! client.tap(120, 640).await?;
//! let screen = client.screenshot().await?;
//! # let _ = screen;
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod operations;
pub mod session;

pub use config::{ClientConfig, DEFAULT_RECONNECT_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ClientError, Result};
pub use events::ClientEvent;
pub use session::{Client, SessionState};

pub use automcp_protocol as protocol;
pub use automcp_transport as transport;
