//! A scripted in-memory transport for session tests.
//!
//! The factory hands out one `ScriptedTransport` per connect attempt and
//! keeps every instance reachable so tests can inject inbound frames and
//! inspect outbound ones. The transport auto-answers `initialize` (per the
//! configured mode) so lifecycle tests don't have to script the handshake.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};

use automcp_transport::{
    InboundFrame, Transport, TransportError, TransportFactory, TransportKind, TransportResult,
};

/// How the transport answers the `initialize` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeMode {
    /// Answer with a well-formed initialize result.
    Reply,
    /// Answer with a server error envelope.
    ReplyError,
    /// Never answer (the handshake will hang until it times out or the
    /// session is torn down).
    Ignore,
}

struct FactoryState {
    kind: TransportKind,
    initialize: StdMutex<InitializeMode>,
    auto_reply: StdMutex<bool>,
    fail_connects: AtomicUsize,
    created: StdMutex<Vec<Arc<ScriptedTransport>>>,
}

/// Scripted transport factory; clone it before handing a box to the client.
#[derive(Clone)]
pub struct ScriptedFactory {
    state: Arc<FactoryState>,
}

impl fmt::Debug for ScriptedFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedFactory")
            .field("kind", &self.state.kind)
            .finish_non_exhaustive()
    }
}

impl ScriptedFactory {
    pub fn socket() -> Self {
        Self::with_kind(TransportKind::Socket)
    }

    pub fn stream() -> Self {
        Self::with_kind(TransportKind::Stream)
    }

    fn with_kind(kind: TransportKind) -> Self {
        Self {
            state: Arc::new(FactoryState {
                kind,
                initialize: StdMutex::new(InitializeMode::Reply),
                auto_reply: StdMutex::new(false),
                fail_connects: AtomicUsize::new(0),
                created: StdMutex::new(Vec::new()),
            }),
        }
    }

    pub fn set_initialize(&self, mode: InitializeMode) {
        *self.state.initialize.lock().unwrap() = mode;
    }

    /// Answer `{"result": {}}` to every non-initialize request.
    pub fn set_auto_reply(&self, enabled: bool) {
        *self.state.auto_reply.lock().unwrap() = enabled;
    }

    /// Make the next `n` connect attempts fail.
    pub fn fail_next_connects(&self, n: usize) {
        self.state.fail_connects.store(n, Ordering::SeqCst);
    }

    /// How many transports have been created.
    pub fn create_count(&self) -> usize {
        self.state.created.lock().unwrap().len()
    }

    /// The most recently created transport.
    pub fn last(&self) -> Arc<ScriptedTransport> {
        self.state
            .created
            .lock()
            .unwrap()
            .last()
            .expect("no transport created yet")
            .clone()
    }

    /// Transport created by attempt `index` (0-based).
    pub fn transport(&self, index: usize) -> Arc<ScriptedTransport> {
        self.state.created.lock().unwrap()[index].clone()
    }
}

impl TransportFactory for ScriptedFactory {
    fn kind(&self) -> TransportKind {
        self.state.kind
    }

    fn create(&self) -> TransportResult<Arc<dyn Transport>> {
        let (tx, rx) = mpsc::channel(64);
        let transport = Arc::new(ScriptedTransport {
            factory: Arc::clone(&self.state),
            sent: StdMutex::new(Vec::new()),
            coupled: StdMutex::new(VecDeque::new()),
            inbound_tx: tx,
            inbound_rx: Mutex::new(rx),
        });
        self.state
            .created
            .lock()
            .unwrap()
            .push(Arc::clone(&transport));
        Ok(transport)
    }
}

pub struct ScriptedTransport {
    factory: Arc<FactoryState>,
    sent: StdMutex<Vec<String>>,
    /// Templates for coupled replies (stream kind); the request's id is
    /// substituted in.
    coupled: StdMutex<VecDeque<Value>>,
    inbound_tx: mpsc::Sender<InboundFrame>,
    inbound_rx: Mutex<mpsc::Receiver<InboundFrame>>,
}

impl fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("kind", &self.factory.kind)
            .finish_non_exhaustive()
    }
}

fn init_result_frame(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "protocolVersion": "2024-11-05",
            "serverInfo": {"name": "scripted-device", "version": "1.0.0"},
            "capabilities": {"tools": {}}
        }
    })
}

fn init_error_frame(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": -32000, "message": "initialize rejected"}
    })
}

fn generic_result_frame(id: u64) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": {}})
}

impl ScriptedTransport {
    /// Inject an inbound text frame.
    pub fn push_text(&self, frame: impl Into<String>) {
        self.inbound_tx
            .try_send(InboundFrame::Text(frame.into()))
            .expect("inbound channel full");
    }

    /// Inject a closure marker, as if the peer hung up.
    pub fn push_closed(&self, reason: &str) {
        self.inbound_tx
            .try_send(InboundFrame::Closed {
                reason: reason.to_string(),
            })
            .expect("inbound channel full");
    }

    /// Queue a coupled reply template (stream kind); the next request's id
    /// is substituted before it is returned from `send`.
    pub fn queue_coupled_reply(&self, template: Value) {
        self.coupled.lock().unwrap().push_back(template);
    }

    /// Raw outbound frames, in send order.
    pub fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Outbound frames parsed as JSON.
    pub fn sent_values(&self) -> Vec<Value> {
        self.sent_frames()
            .iter()
            .map(|f| serde_json::from_str(f).unwrap())
            .collect()
    }

    /// Ids of outbound requests (frames that carry an id), in send order.
    pub fn sent_request_ids(&self) -> Vec<u64> {
        self.sent_values()
            .iter()
            .filter_map(|v| v.get("id").and_then(Value::as_u64))
            .collect()
    }

    /// The id the client assigned to its request for `method`, if sent.
    pub fn request_id_for(&self, method: &str) -> Option<u64> {
        self.sent_values().iter().find_map(|v| {
            (v.get("method").and_then(Value::as_str) == Some(method))
                .then(|| v.get("id").and_then(Value::as_u64))
                .flatten()
        })
    }

    /// Whether a frame for `method` has been sent.
    pub fn saw_method(&self, method: &str) -> bool {
        self.sent_values()
            .iter()
            .any(|v| v.get("method").and_then(Value::as_str) == Some(method))
    }

    fn reply_for(&self, id: Option<u64>, method: &str) -> Option<Value> {
        match (id, method) {
            (Some(id), "initialize") => match *self.factory.initialize.lock().unwrap() {
                InitializeMode::Reply => Some(init_result_frame(id)),
                InitializeMode::ReplyError => Some(init_error_frame(id)),
                InitializeMode::Ignore => None,
            },
            (Some(id), _) => {
                if let Some(mut template) = self.coupled.lock().unwrap().pop_front() {
                    template["id"] = json!(id);
                    template["jsonrpc"] = json!("2.0");
                    Some(template)
                } else if *self.factory.auto_reply.lock().unwrap() {
                    Some(generic_result_frame(id))
                } else {
                    None
                }
            }
            (None, _) => None,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        self.factory.kind
    }

    fn endpoint(&self) -> String {
        format!("scripted://{}", self.factory.kind)
    }

    async fn connect(&self) -> TransportResult<()> {
        let remaining = self.factory.fail_connects.load(Ordering::SeqCst);
        if remaining > 0 {
            self.factory
                .fail_connects
                .store(remaining - 1, Ordering::SeqCst);
            return Err(TransportError::ConnectFailed("scripted refusal".to_string()));
        }
        Ok(())
    }

    async fn send(&self, frame: String) -> TransportResult<Option<String>> {
        let value: Value = serde_json::from_str(&frame).expect("client sent invalid JSON");
        let id = value.get("id").and_then(Value::as_u64);
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.sent.lock().unwrap().push(frame);

        let reply = self.reply_for(id, &method);
        match self.factory.kind {
            TransportKind::Socket => {
                if let Some(reply) = reply {
                    let _ = self.inbound_tx.try_send(InboundFrame::Text(reply.to_string()));
                }
                Ok(None)
            }
            TransportKind::Stream => match reply {
                Some(reply) => Ok(Some(reply.to_string())),
                // Notifications get an empty body; unanswered requests hang
                // the way a stalled HTTP server would.
                None if id.is_none() => Ok(Some(String::new())),
                None => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            },
        }
    }

    async fn receive(&self) -> Option<InboundFrame> {
        self.inbound_rx.lock().await.recv().await
    }

    async fn close(&self) -> TransportResult<()> {
        Ok(())
    }
}

/// Poll `condition` until it holds, panicking after a generous bound.
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..2000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached: {what}");
}
