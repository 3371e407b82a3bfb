//! Screen capture and image search.

use serde_json::{Value, json};

use crate::error::Result;
use crate::session::Client;

impl Client {
    /// Capture the screen; returns the agent's image payload.
    pub async fn screenshot(&self) -> Result<Value> {
        self.call_tool("screenshot", None).await
    }

    /// Search the screen for a template image (base64-encoded).
    pub async fn find_image(&self, image: &str) -> Result<Value> {
        self.call_tool("find_image", Some(json!({ "image": image }))).await
    }

    /// Wait up to `timeout_ms` for a template image to appear on screen.
    pub async fn wait_for_image(&self, image: &str, timeout_ms: u64) -> Result<Value> {
        self.call_tool(
            "wait_for_image",
            Some(json!({ "image": image, "timeoutMs": timeout_ms })),
        )
        .await
    }

    /// The device screen dimensions.
    pub async fn screen_size(&self) -> Result<Value> {
        self.call_tool("screen_size", None).await
    }

    /// The color of one screen pixel.
    pub async fn pixel_color(&self, x: i64, y: i64) -> Result<Value> {
        self.call_tool("pixel_color", Some(json!({ "x": x, "y": y }))).await
    }
}
