//! Protocol types for the automcp client.
//!
//! This crate defines the JSON-RPC 2.0 envelopes the client puts on the wire
//! and the MCP-specific payload types it exchanges with a device agent:
//! the `initialize` handshake, tool listing/invocation, and resource access.
//!
//! Everything here is plain data. Transport and correlation concerns live in
//! `automcp-transport` and `automcp-client`.

pub mod jsonrpc;
pub mod types;

pub use jsonrpc::{
    InboundMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    JsonRpcResponsePayload, JsonRpcVersion, JSONRPC_VERSION,
};
pub use types::{
    CallToolParams, CallToolResult, ClientInfo, Content, InitializeParams, InitializeResult,
    ListResourcesResult, ListToolsResult, ReadResourceParams, ReadResourceResult, ResourceContents,
    ResourceInfo, ServerCapabilities, ServerInfo, ToolInfo, PROTOCOL_VERSION,
};
