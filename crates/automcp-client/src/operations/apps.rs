//! Application lifecycle on the device.

use serde_json::{Value, json};

use crate::error::Result;
use crate::session::Client;

impl Client {
    /// Launch an app by identifier.
    pub async fn launch_app(&self, app_id: &str) -> Result<Value> {
        self.call_tool("launch_app", Some(json!({ "appId": app_id }))).await
    }

    /// Stop an app by identifier.
    pub async fn stop_app(&self, app_id: &str) -> Result<Value> {
        self.call_tool("stop_app", Some(json!({ "appId": app_id }))).await
    }

    /// List installed apps.
    pub async fn list_apps(&self) -> Result<Value> {
        self.call_tool("list_apps", None).await
    }

    /// The app currently in the foreground.
    pub async fn current_app(&self) -> Result<Value> {
        self.call_tool("current_app", None).await
    }

    /// Open a URL with the device's default handler.
    pub async fn open_url(&self, url: &str) -> Result<Value> {
        self.call_tool("open_url", Some(json!({ "url": url }))).await
    }
}
