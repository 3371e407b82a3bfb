//! JSON-RPC 2.0 envelopes.
//!
//! The wire format is standard JSON-RPC 2.0 carried as discrete text frames.
//! A response carries exactly one of `result`/`error`; that exclusivity is
//! encoded in the type ([`JsonRpcResponsePayload`]) rather than checked at
//! call sites.
//!
//! Request ids are bare `u64`s. The client is the only party that issues ids,
//! assigns them monotonically starting at 1, and never reuses one, so the
//! string-or-number id union permitted by the JSON-RPC grammar is not needed
//! here. An inbound id that is not a non-negative integer cannot match any
//! pending request and is classified as unroutable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Zero-sized marker that serializes as the literal `"2.0"` and rejects
/// anything else on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let version = String::deserialize(deserializer)?;
        if version == JSONRPC_VERSION {
            Ok(JsonRpcVersion)
        } else {
            Err(serde::de::Error::custom(format!(
                "invalid JSON-RPC version: expected '{JSONRPC_VERSION}', got '{version}'"
            )))
        }
    }
}

/// An outbound request expecting a correlated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version marker.
    pub jsonrpc: JsonRpcVersion,
    /// Request id; unique among outstanding requests.
    pub id: u64,
    /// Method name.
    pub method: String,
    /// Method parameters, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request envelope for `method` with the given id.
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id,
            method: method.into(),
            params,
        }
    }
}

/// A notification: a method invocation with no id and no response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version marker.
    pub jsonrpc: JsonRpcVersion,
    /// Method name.
    pub method: String,
    /// Parameters, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Build a notification envelope for `method`.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
        }
    }
}

/// A server-supplied error object: `{code, message, data?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Response payload: exactly one of `result`/`error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcResponsePayload {
    /// Successful response.
    Success {
        /// The result value.
        result: Value,
    },
    /// Failed response.
    Error {
        /// The error object.
        error: JsonRpcError,
    },
}

/// An inbound response correlated to a request by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version marker.
    pub jsonrpc: JsonRpcVersion,
    /// Id of the request this answers.
    pub id: u64,
    /// Result or error, never both.
    #[serde(flatten)]
    pub payload: JsonRpcResponsePayload,
}

impl JsonRpcResponse {
    /// Collapse the payload into a plain `Result`.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.payload {
            JsonRpcResponsePayload::Success { result } => Ok(result),
            JsonRpcResponsePayload::Error { error } => Err(error),
        }
    }

    /// Whether the payload is an error.
    pub fn is_error(&self) -> bool {
        matches!(self.payload, JsonRpcResponsePayload::Error { .. })
    }
}

/// A decoded inbound frame.
///
/// Frames with an id are responses routed to the correlator; frames with a
/// method and no id are notifications routed to event observers. Anything
/// else is unroutable and discarded with a diagnostic by the caller.
#[derive(Debug, Clone)]
pub enum InboundMessage {
    /// A response to a request this client issued.
    Response(JsonRpcResponse),
    /// A server-initiated notification.
    Notification(JsonRpcNotification),
}

impl InboundMessage {
    /// Classify a raw text frame.
    ///
    /// Returns `None` for frames that are neither a well-formed response nor
    /// a well-formed notification: invalid JSON, a bad version marker, an id
    /// that is not a non-negative integer, a frame carrying both an id and a
    /// method, or a frame carrying neither. Malformed input is never an
    /// error — the caller drops it with a diagnostic and moves on.
    pub fn classify(frame: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(frame).ok()?;
        let has_id = value.get("id").is_some();
        let has_method = value.get("method").is_some();
        match (has_id, has_method) {
            (true, false) => serde_json::from_value(value).ok().map(Self::Response),
            (false, true) => serde_json::from_value(value).ok().map(Self::Notification),
            _ => None,
        }
    }
}
