//! Client operations.
//!
//! `protocol` holds the generic MCP primitives; the other modules are the
//! generated device facade — every method is a one-expression delegation of
//! a tool name and argument record to [`call_tool`](crate::Client::call_tool).

mod apps;
mod files;
mod gestures;
mod protocol;
mod screen;
mod ui;
