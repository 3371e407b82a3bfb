//! Generic MCP primitives: tools, resources, ping.

use serde_json::Value;

use automcp_protocol::{
    CallToolParams, CallToolResult, Content, ListResourcesResult, ListToolsResult,
    ReadResourceParams, ReadResourceResult, ResourceInfo, ToolInfo,
};

use crate::error::Result;
use crate::session::Client;

/// Unwrap a `tools/call` result envelope.
///
/// If the envelope decodes as a tool result whose first content item is
/// textual, the text is opportunistically JSON-decoded, falling back to the
/// literal text. Anything else — a non-text content item, no content, or an
/// envelope that does not match the tool-result shape — passes through
/// untouched.
fn unwrap_tool_result(envelope: Value) -> Value {
    let Ok(result) = serde_json::from_value::<CallToolResult>(envelope.clone()) else {
        return envelope;
    };
    match result.content.first() {
        Some(Content::Text { text, .. }) => {
            serde_json::from_str::<Value>(text).unwrap_or_else(|_| Value::String(text.clone()))
        }
        _ => envelope,
    }
}

impl Client {
    /// List the tools the device agent advertises.
    pub async fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        let value = self.request("tools/list", None).await?;
        let result: ListToolsResult = serde_json::from_value(value)?;
        Ok(result.tools)
    }

    /// Invoke a named remote tool.
    ///
    /// This is the primitive every convenience method delegates to. Textual
    /// results are opportunistically JSON-decoded; non-JSON text comes back
    /// as the literal string and non-text results come back as the raw
    /// result envelope.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<Value> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        let value = self
            .request("tools/call", Some(serde_json::to_value(&params)?))
            .await?;
        Ok(unwrap_tool_result(value))
    }

    /// List the resources the device agent advertises.
    pub async fn list_resources(&self) -> Result<Vec<ResourceInfo>> {
        let value = self.request("resources/list", None).await?;
        let result: ListResourcesResult = serde_json::from_value(value)?;
        Ok(result.resources)
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        let params = ReadResourceParams {
            uri: uri.to_string(),
        };
        let value = self
            .request("resources/read", Some(serde_json::to_value(&params)?))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Liveness round-trip.
    pub async fn ping(&self) -> Result<()> {
        self.request("ping", None).await?;
        Ok(())
    }
}
