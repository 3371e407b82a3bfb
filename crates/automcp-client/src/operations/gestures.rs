//! Gesture input.

use serde_json::{Value, json};

use crate::error::Result;
use crate::session::Client;

impl Client {
    /// Swipe from one point to another over `duration_ms`.
    pub async fn swipe(&self, x1: i64, y1: i64, x2: i64, y2: i64, duration_ms: u64) -> Result<Value> {
        self.call_tool(
            "swipe",
            Some(json!({ "x1": x1, "y1": y1, "x2": x2, "y2": y2, "durationMs": duration_ms })),
        )
        .await
    }

    /// Drag from one point to another (press, move, release).
    pub async fn drag(&self, x1: i64, y1: i64, x2: i64, y2: i64, duration_ms: u64) -> Result<Value> {
        self.call_tool(
            "drag",
            Some(json!({ "x1": x1, "y1": y1, "x2": x2, "y2": y2, "durationMs": duration_ms })),
        )
        .await
    }

    /// Pinch around a center point; `scale` < 1 zooms out, > 1 zooms in.
    pub async fn pinch(&self, x: i64, y: i64, scale: f64) -> Result<Value> {
        self.call_tool("pinch", Some(json!({ "x": x, "y": y, "scale": scale }))).await
    }

    /// Scroll in a direction (`"up"`, `"down"`, `"left"`, `"right"`).
    pub async fn scroll(&self, direction: &str, amount: i64) -> Result<Value> {
        self.call_tool(
            "scroll",
            Some(json!({ "direction": direction, "amount": amount })),
        )
        .await
    }

    /// Fast fling in a direction.
    pub async fn fling(&self, direction: &str) -> Result<Value> {
        self.call_tool("fling", Some(json!({ "direction": direction }))).await
    }
}
