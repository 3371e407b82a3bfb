//! Typed lifecycle events and observer dispatch.
//!
//! Events are a closed set of variants with one ordered handler list per
//! variant. Dispatch is synchronous and order-preserving: handlers run in
//! registration order, a handler registered twice runs twice, and a handler
//! that panics is logged and skipped without disturbing the rest of the list
//! or the session.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::ClientError;
use crate::session::SessionState;

/// Observer of a successful connection.
pub type ConnectHandler = Arc<dyn Fn() + Send + Sync>;
/// Observer of a disconnection; receives the reason text.
pub type DisconnectHandler = Arc<dyn Fn(&str) + Send + Sync>;
/// Observer of a session error.
pub type ErrorHandler = Arc<dyn Fn(&ClientError) + Send + Sync>;
/// Observer of a server notification; receives method and params.
pub type NotificationHandler = Arc<dyn Fn(&str, Option<&Value>) + Send + Sync>;
/// Observer of a state transition; receives the new state.
pub type StateChangeHandler = Arc<dyn Fn(SessionState) + Send + Sync>;

/// The closed set of session lifecycle events.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Handshake completed; the session is usable.
    Connected,
    /// The session lost or gave up its transport.
    Disconnected {
        /// Close reason, or `"client initiated"` for explicit disconnects.
        reason: String,
    },
    /// A connect attempt or the session itself failed.
    Error {
        /// The failure.
        error: ClientError,
    },
    /// An unsolicited server notification.
    Notification {
        /// Notification method name.
        method: String,
        /// Notification parameters.
        params: Option<Value>,
    },
    /// The session state changed.
    StateChanged {
        /// The new state.
        state: SessionState,
    },
}

/// Per-variant ordered handler lists.
#[derive(Default)]
pub(crate) struct EventHandlers {
    connect: Mutex<Vec<ConnectHandler>>,
    disconnect: Mutex<Vec<DisconnectHandler>>,
    error: Mutex<Vec<ErrorHandler>>,
    notification: Mutex<Vec<NotificationHandler>>,
    state_change: Mutex<Vec<StateChangeHandler>>,
}

/// Run one handler, containing any panic to that handler alone.
fn run_isolated(kind: &str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::error!(event = kind, "event handler panicked, continuing with remaining handlers");
    }
}

impl EventHandlers {
    pub(crate) fn on_connect(&self, handler: ConnectHandler) {
        self.connect.lock().expect("handler list poisoned").push(handler);
    }

    pub(crate) fn on_disconnect(&self, handler: DisconnectHandler) {
        self.disconnect.lock().expect("handler list poisoned").push(handler);
    }

    pub(crate) fn on_error(&self, handler: ErrorHandler) {
        self.error.lock().expect("handler list poisoned").push(handler);
    }

    pub(crate) fn on_notification(&self, handler: NotificationHandler) {
        self.notification.lock().expect("handler list poisoned").push(handler);
    }

    pub(crate) fn on_state_change(&self, handler: StateChangeHandler) {
        self.state_change.lock().expect("handler list poisoned").push(handler);
    }

    /// Dispatch an event to its variant's handlers, in registration order.
    ///
    /// The list is snapshotted before dispatch, so a handler may register
    /// further handlers without deadlocking; additions take effect from the
    /// next event.
    pub(crate) fn emit(&self, event: ClientEvent) {
        match event {
            ClientEvent::Connected => {
                let handlers = self.connect.lock().expect("handler list poisoned").clone();
                for h in handlers {
                    run_isolated("connect", || h());
                }
            }
            ClientEvent::Disconnected { reason } => {
                let handlers = self.disconnect.lock().expect("handler list poisoned").clone();
                for h in handlers {
                    run_isolated("disconnect", || h(&reason));
                }
            }
            ClientEvent::Error { error } => {
                let handlers = self.error.lock().expect("handler list poisoned").clone();
                for h in handlers {
                    run_isolated("error", || h(&error));
                }
            }
            ClientEvent::Notification { method, params } => {
                let handlers = self
                    .notification
                    .lock()
                    .expect("handler list poisoned")
                    .clone();
                for h in handlers {
                    run_isolated("notification", || h(&method, params.as_ref()));
                }
            }
            ClientEvent::StateChanged { state } => {
                let handlers = self
                    .state_change
                    .lock()
                    .expect("handler list poisoned")
                    .clone();
                for h in handlers {
                    run_isolated("stateChange", || h(state));
                }
            }
        }
    }
}
