//! The session engine.
//!
//! One [`Client`] owns one live connection context: the lifecycle state
//! machine, the request correlator, the inbound router, and the reconnect
//! policy.
//!
//! # Architecture
//!
//! `Client` is a cheaply-cloneable Arc wrapper over interior state (the same
//! pattern reqwest uses); all clones share the connection. A background
//! router task per live transport is the sole consumer of the transport's
//! inbound stream: it settles responses against the pending table and fans
//! notifications out to observers. Requests register a oneshot waiter in the
//! pending table *before* sending, so the response can never race past its
//! waiter.
//!
//! Settlement of a pending request is atomic remove-then-send in every path
//! (response, timeout, teardown), which makes double settlement impossible
//! and keeps the invariant that the table never holds an entry whose outcome
//! has already been decided.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use automcp_protocol::{
    InboundMessage, InitializeParams, InitializeResult, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, ServerCapabilities, ServerInfo,
};
use automcp_transport::{InboundFrame, Transport, TransportError, TransportFactory, TransportKind};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{ClientEvent, EventHandlers};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport; the initial state, and the terminal state on request.
    Disconnected,
    /// A connect attempt (transport open + handshake) is in flight.
    Connecting,
    /// Handshake completed; requests can be issued.
    Connected,
    /// The last connect attempt failed.
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Interior session state shared by all clones of a [`Client`].
pub(crate) struct ClientInner {
    config: ClientConfig,
    factory: Box<dyn TransportFactory>,
    /// Correlates log lines of this session's background tasks.
    session_id: Uuid,
    state: StdMutex<SessionState>,
    /// The active transport; at most one at any time.
    transport: Mutex<Option<Arc<dyn Transport>>>,
    /// Server descriptor cached by the handshake.
    server: StdMutex<Option<InitializeResult>>,
    /// Monotonic request id counter; never reset, even across reconnects.
    next_id: AtomicU64,
    /// Outstanding requests keyed by id.
    pending: DashMap<u64, oneshot::Sender<Result<Value>>>,
    handlers: EventHandlers,
    /// Pending scheduled reconnect; at most one at any time.
    reconnect: StdMutex<Option<JoinHandle<()>>>,
    /// Router task of the active transport.
    router: StdMutex<Option<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        tracing::debug!(session = %self.session_id, "last client reference dropped, stopping background tasks");
        if let Ok(mut guard) = self.router.lock()
            && let Some(handle) = guard.take()
        {
            handle.abort();
        }
        if let Ok(mut guard) = self.reconnect.lock()
            && let Some(handle) = guard.take()
        {
            handle.abort();
        }
    }
}

/// A client session against one device agent.
///
/// Cloning is cheap and all clones share the same session. Construct with
/// [`Client::new`], call [`Client::connect`], then issue requests through
/// the operation methods or [`Client::request`] directly.
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl Clone for Client {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("session_id", &self.inner.session_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the configured endpoint. No I/O happens until
    /// [`connect`](Self::connect).
    pub fn new(config: ClientConfig) -> Self {
        let factory = config.build_factory();
        Self::with_factory(config, factory)
    }

    /// Create a client with an explicit transport factory.
    ///
    /// The factory is consulted once per connect attempt, so every reconnect
    /// gets a fresh transport handle.
    pub fn with_factory(config: ClientConfig, factory: Box<dyn TransportFactory>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                factory,
                session_id: Uuid::new_v4(),
                state: StdMutex::new(SessionState::Disconnected),
                transport: Mutex::new(None),
                server: StdMutex::new(None),
                next_id: AtomicU64::new(1),
                pending: DashMap::new(),
                handlers: EventHandlers::default(),
                reconnect: StdMutex::new(None),
                router: StdMutex::new(None),
            }),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.inner.state.lock().expect("state mutex poisoned")
    }

    /// Whether the session is connected.
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// The server identity negotiated by the handshake, if connected.
    pub fn server_info(&self) -> Option<ServerInfo> {
        self.inner
            .server
            .lock()
            .expect("server mutex poisoned")
            .as_ref()
            .map(|r| r.server_info.clone())
    }

    /// The capability flags negotiated by the handshake, if connected.
    pub fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.inner
            .server
            .lock()
            .expect("server mutex poisoned")
            .as_ref()
            .map(|r| r.capabilities.clone())
    }

    /// Whether a reconnect is currently scheduled.
    pub fn reconnect_pending(&self) -> bool {
        self.inner
            .reconnect
            .lock()
            .expect("reconnect mutex poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // ------------------------------------------------------------------
    // Observer registration
    // ------------------------------------------------------------------

    /// Observe successful connections.
    pub fn on_connect(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.inner.handlers.on_connect(Arc::new(handler));
    }

    /// Observe disconnections; the handler receives the reason text.
    pub fn on_disconnect(&self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.inner.handlers.on_disconnect(Arc::new(handler));
    }

    /// Observe session errors.
    pub fn on_error(&self, handler: impl Fn(&ClientError) + Send + Sync + 'static) {
        self.inner.handlers.on_error(Arc::new(handler));
    }

    /// Observe server notifications.
    pub fn on_notification(
        &self,
        handler: impl Fn(&str, Option<&Value>) + Send + Sync + 'static,
    ) {
        self.inner.handlers.on_notification(Arc::new(handler));
    }

    /// Observe state transitions; fires once per actual change.
    pub fn on_state_change(&self, handler: impl Fn(SessionState) + Send + Sync + 'static) {
        self.inner.handlers.on_state_change(Arc::new(handler));
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open a transport and perform the handshake.
    ///
    /// Fails with [`ClientError::AlreadyConnected`] when connected and
    /// [`ClientError::ConnectInProgress`] while another attempt is running;
    /// neither opens a second transport. On open or handshake failure the
    /// session moves to [`SessionState::Error`], the error is emitted as an
    /// error event, and the same error is returned.
    pub async fn connect(&self) -> Result<InitializeResult> {
        {
            let mut state = self.inner.state.lock().expect("state mutex poisoned");
            match *state {
                SessionState::Connected => return Err(ClientError::AlreadyConnected),
                SessionState::Connecting => return Err(ClientError::ConnectInProgress),
                SessionState::Disconnected | SessionState::Error => {
                    *state = SessionState::Connecting;
                }
            }
        }
        self.inner.handlers.emit(ClientEvent::StateChanged {
            state: SessionState::Connecting,
        });

        match self.open_and_handshake().await {
            Ok(result) => {
                *self.inner.server.lock().expect("server mutex poisoned") = Some(result.clone());
                self.set_state(SessionState::Connected);
                self.inner.handlers.emit(ClientEvent::Connected);
                tracing::info!(
                    session = %self.inner.session_id,
                    server = %result.server_info.name,
                    version = %result.server_info.version,
                    "session connected"
                );
                Ok(result)
            }
            Err(err) => {
                self.teardown_transport().await;
                if matches!(err, ClientError::Disconnected) {
                    // An explicit disconnect raced the attempt; honor it.
                    self.set_state(SessionState::Disconnected);
                } else {
                    self.set_state(SessionState::Error);
                    tracing::warn!(session = %self.inner.session_id, error = %err, "connect failed");
                    self.inner.handlers.emit(ClientEvent::Error { error: err.clone() });
                }
                Err(err)
            }
        }
    }

    /// Tear the session down from any state.
    ///
    /// Cancels a pending reconnect, closes the transport if present, fails
    /// every outstanding request with "client disconnected", and emits a
    /// disconnect event tagged `"client initiated"`.
    pub async fn disconnect(&self) {
        if let Some(handle) = self
            .inner
            .reconnect
            .lock()
            .expect("reconnect mutex poisoned")
            .take()
        {
            handle.abort();
        }

        // Transition first so the router treats the closure as ours.
        self.set_state(SessionState::Disconnected);
        self.teardown_transport().await;
        *self.inner.server.lock().expect("server mutex poisoned") = None;

        tracing::info!(session = %self.inner.session_id, "session disconnected");
        self.inner.handlers.emit(ClientEvent::Disconnected {
            reason: "client initiated".to_string(),
        });
    }

    async fn open_and_handshake(&self) -> Result<InitializeResult> {
        let transport = self.inner.factory.create()?;
        transport.connect().await?;

        *self.inner.transport.lock().await = Some(Arc::clone(&transport));
        let router = self.spawn_router(Arc::clone(&transport));
        if let Some(old) = self
            .inner
            .router
            .lock()
            .expect("router mutex poisoned")
            .replace(router)
        {
            old.abort();
        }

        let params = InitializeParams::new(self.inner.config.client_info.clone());
        let value = self
            .request("initialize", Some(serde_json::to_value(&params)?))
            .await?;
        let result: InitializeResult = serde_json::from_value(value)
            .map_err(|e| ClientError::Handshake(format!("malformed initialize result: {e}")))?;
        self.notify("notifications/initialized", None).await?;
        Ok(result)
    }

    /// Drop the transport, stop its router, and fail all pending requests.
    async fn teardown_transport(&self) {
        let transport = self.inner.transport.lock().await.take();
        if let Some(t) = transport {
            let _ = t.close().await;
        }
        if let Some(handle) = self
            .inner
            .router
            .lock()
            .expect("router mutex poisoned")
            .take()
        {
            handle.abort();
        }
        self.fail_all_pending(ClientError::Disconnected);
    }

    fn set_state(&self, new: SessionState) {
        let changed = {
            let mut state = self.inner.state.lock().expect("state mutex poisoned");
            if *state == new {
                false
            } else {
                *state = new;
                true
            }
        };
        if changed {
            self.inner
                .handlers
                .emit(ClientEvent::StateChanged { state: new });
        }
    }

    // ------------------------------------------------------------------
    // Correlator
    // ------------------------------------------------------------------

    /// Send a correlated request and await its result.
    ///
    /// Allocates the next id (strictly increasing from 1 for the lifetime of
    /// this client, never reused), registers a waiter, transmits, and
    /// settles exactly once: with the response's result, with the server's
    /// error, with [`ClientError::Timeout`], or with
    /// [`ClientError::Disconnected`] if the session is torn down first.
    ///
    /// With no transport present this fails immediately with
    /// [`ClientError::NotConnected`]; requests are never queued.
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let transport = self.current_transport().await?;
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&JsonRpcRequest::new(id, method, params))?;
        let timeout = self.inner.config.request_timeout;

        if transport.kind() == TransportKind::Stream {
            // The POST's HTTP response is the protocol response; success or
            // failure derives from the HTTP status and the embedded error
            // field, and no pending entry is registered for inbound routing.
            let reply = tokio::time::timeout(timeout, transport.send(frame))
                .await
                .map_err(|_| ClientError::Timeout)??;
            let body = reply.ok_or_else(|| {
                ClientError::Serialization("stream transport returned no response body".to_string())
            })?;
            let response: JsonRpcResponse = serde_json::from_str(&body)?;
            return response.into_result().map_err(ClientError::from_rpc);
        }

        let (tx, mut rx) = oneshot::channel();
        self.inner.pending.insert(id, tx);
        tracing::trace!(session = %self.inner.session_id, id, method, "request registered");

        if let Err(e) = transport.send(frame).await {
            self.inner.pending.remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(outcome)) => outcome,
            // The sender was dropped without settling: teardown won.
            Ok(Err(_)) => Err(ClientError::Disconnected),
            Err(_) => {
                // Settle the timeout by removing the entry. If it is already
                // gone the response won the race and its outcome stands.
                if self.inner.pending.remove(&id).is_some() {
                    tracing::debug!(session = %self.inner.session_id, id, method, "request timed out");
                    Err(ClientError::Timeout)
                } else {
                    match rx.try_recv() {
                        Ok(outcome) => outcome,
                        Err(_) => Err(ClientError::Disconnected),
                    }
                }
            }
        }
    }

    /// Send a notification; no id, no response.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let transport = self.current_transport().await?;
        let frame = serde_json::to_string(&JsonRpcNotification::new(method, params))?;
        // A coupled reply (stream variant) carries nothing for a
        // notification and is dropped.
        transport.send(frame).await?;
        Ok(())
    }

    async fn current_transport(&self) -> Result<Arc<dyn Transport>> {
        self.inner
            .transport
            .lock()
            .await
            .clone()
            .ok_or(ClientError::NotConnected)
    }

    // ------------------------------------------------------------------
    // Router
    // ------------------------------------------------------------------

    /// Spawn the single consumer of a transport's inbound stream.
    ///
    /// Holds only a weak reference to the session so dropping the last
    /// `Client` clone tears the task down rather than leaking it.
    fn spawn_router(&self, transport: Arc<dyn Transport>) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            loop {
                let Some(frame) = transport.receive().await else {
                    break;
                };
                let Some(inner) = weak.upgrade() else { break };
                let client = Client { inner };
                match frame {
                    InboundFrame::Text(text) => client.route_frame(&text),
                    InboundFrame::Closed { reason } => {
                        client.handle_transport_closed(&transport, reason).await;
                        break;
                    }
                }
            }
        })
    }

    /// Classify one inbound frame and dispatch it.
    fn route_frame(&self, text: &str) {
        match InboundMessage::classify(text) {
            Some(InboundMessage::Response(response)) => {
                let id = response.id;
                match self.inner.pending.remove(&id) {
                    Some((_, tx)) => {
                        let outcome = response.into_result().map_err(ClientError::from_rpc);
                        let _ = tx.send(outcome);
                    }
                    None => {
                        tracing::trace!(
                            session = %self.inner.session_id,
                            id,
                            "response for unknown or settled id, dropped"
                        );
                    }
                }
            }
            Some(InboundMessage::Notification(note)) => {
                self.inner.handlers.emit(ClientEvent::Notification {
                    method: note.method,
                    params: note.params,
                });
            }
            None => {
                tracing::warn!(session = %self.inner.session_id, "discarding malformed inbound frame");
            }
        }
    }

    /// React to an unexpected transport closure.
    async fn handle_transport_closed(&self, closed: &Arc<dyn Transport>, reason: String) {
        {
            let mut slot = self.inner.transport.lock().await;
            match slot.as_ref() {
                Some(active) if Arc::ptr_eq(active, closed) => *slot = None,
                // Client-initiated teardown or a stale transport.
                _ => return,
            }
        }
        let _ = closed.close().await;

        if self.state() == SessionState::Connecting {
            // The channel died mid-handshake; fail the connect() caller's
            // pending request so the attempt surfaces a transport error
            // instead of entering the disconnect/reconnect path.
            self.fail_all_pending(ClientError::Transport(TransportError::ConnectionLost(reason)));
            return;
        }

        self.fail_all_pending(ClientError::Disconnected);
        self.set_state(SessionState::Disconnected);
        tracing::info!(session = %self.inner.session_id, reason = %reason, "transport closed unexpectedly");
        self.inner
            .handlers
            .emit(ClientEvent::Disconnected { reason });

        if self.inner.config.auto_reconnect {
            self.schedule_reconnect();
        }
    }

    /// Fail every outstanding request at once. Leaves the table empty.
    fn fail_all_pending(&self, err: ClientError) {
        let ids: Vec<u64> = self.inner.pending.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, tx)) = self.inner.pending.remove(&id) {
                let _ = tx.send(Err(err.clone()));
            }
        }
    }

    // ------------------------------------------------------------------
    // Reconnection
    // ------------------------------------------------------------------

    /// Schedule a reconnect after the configured interval.
    ///
    /// A no-op while one is already pending. The task re-arms itself on
    /// failure — fixed interval, no backoff, no attempt cap — and stops on
    /// success or when the session is explicitly disconnected (which aborts
    /// it).
    fn schedule_reconnect(&self) {
        let mut slot = self
            .inner
            .reconnect
            .lock()
            .expect("reconnect mutex poisoned");
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!(session = %self.inner.session_id, "reconnect already scheduled");
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.config.reconnect_interval;
        tracing::debug!(session = %self.inner.session_id, ?interval, "reconnect scheduled");
        *slot = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(inner) = weak.upgrade() else { break };
                let client = Client { inner };
                match client.connect().await {
                    Ok(_) => break,
                    Err(ClientError::AlreadyConnected | ClientError::ConnectInProgress) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "reconnect attempt failed, timer re-armed");
                    }
                }
            }
        }));
    }
}
