//! UI actions: pointer input, keyboard, clipboard, element queries.

use serde_json::{Value, json};

use crate::error::Result;
use crate::session::Client;

impl Client {
    /// Tap at absolute screen coordinates.
    pub async fn tap(&self, x: i64, y: i64) -> Result<Value> {
        self.call_tool("tap", Some(json!({ "x": x, "y": y }))).await
    }

    /// Double-tap at absolute screen coordinates.
    pub async fn double_tap(&self, x: i64, y: i64) -> Result<Value> {
        self.call_tool("double_tap", Some(json!({ "x": x, "y": y }))).await
    }

    /// Press and hold for `duration_ms`.
    pub async fn long_press(&self, x: i64, y: i64, duration_ms: u64) -> Result<Value> {
        self.call_tool(
            "long_press",
            Some(json!({ "x": x, "y": y, "durationMs": duration_ms })),
        )
        .await
    }

    /// Type text into the focused element.
    pub async fn type_text(&self, text: &str) -> Result<Value> {
        self.call_tool("type_text", Some(json!({ "text": text }))).await
    }

    /// Press a named key (e.g. `"enter"`, `"back"`).
    pub async fn press_key(&self, key: &str) -> Result<Value> {
        self.call_tool("press_key", Some(json!({ "key": key }))).await
    }

    /// Replace the device clipboard.
    pub async fn set_clipboard(&self, text: &str) -> Result<Value> {
        self.call_tool("set_clipboard", Some(json!({ "text": text }))).await
    }

    /// Read the device clipboard.
    pub async fn get_clipboard(&self) -> Result<Value> {
        self.call_tool("get_clipboard", None).await
    }

    /// Dump the current UI hierarchy.
    pub async fn dump_ui(&self) -> Result<Value> {
        self.call_tool("dump_ui", None).await
    }

    /// Find an element matching a selector query.
    pub async fn find_element(&self, query: &str) -> Result<Value> {
        self.call_tool("find_element", Some(json!({ "query": query }))).await
    }

    /// Wait up to `timeout_ms` for an element matching a selector query.
    pub async fn wait_for_element(&self, query: &str, timeout_ms: u64) -> Result<Value> {
        self.call_tool(
            "wait_for_element",
            Some(json!({ "query": query, "timeoutMs": timeout_ms })),
        )
        .await
    }
}
