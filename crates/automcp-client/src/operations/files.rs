//! File operations on the device.

use serde_json::{Value, json};

use crate::error::Result;
use crate::session::Client;

impl Client {
    /// Read a file's contents.
    pub async fn read_file(&self, path: &str) -> Result<Value> {
        self.call_tool("read_file", Some(json!({ "path": path }))).await
    }

    /// Write (create or overwrite) a file.
    pub async fn write_file(&self, path: &str, contents: &str) -> Result<Value> {
        self.call_tool("write_file", Some(json!({ "path": path, "contents": contents })))
            .await
    }

    /// Append to a file.
    pub async fn append_file(&self, path: &str, contents: &str) -> Result<Value> {
        self.call_tool("append_file", Some(json!({ "path": path, "contents": contents })))
            .await
    }

    /// Delete a file.
    pub async fn delete_file(&self, path: &str) -> Result<Value> {
        self.call_tool("delete_file", Some(json!({ "path": path }))).await
    }

    /// List a directory.
    pub async fn list_dir(&self, path: &str) -> Result<Value> {
        self.call_tool("list_dir", Some(json!({ "path": path }))).await
    }

    /// Create a directory, including parents.
    pub async fn make_dir(&self, path: &str) -> Result<Value> {
        self.call_tool("make_dir", Some(json!({ "path": path }))).await
    }

    /// Move or rename a path.
    pub async fn move_path(&self, source: &str, destination: &str) -> Result<Value> {
        self.call_tool(
            "move_path",
            Some(json!({ "source": source, "destination": destination })),
        )
        .await
    }

    /// Copy a path.
    pub async fn copy_path(&self, source: &str, destination: &str) -> Result<Value> {
        self.call_tool(
            "copy_path",
            Some(json!({ "source": source, "destination": destination })),
        )
        .await
    }

    /// Whether a path exists.
    pub async fn path_exists(&self, path: &str) -> Result<Value> {
        self.call_tool("path_exists", Some(json!({ "path": path }))).await
    }

    /// Size, kind, and timestamps of a path.
    pub async fn stat_path(&self, path: &str) -> Result<Value> {
        self.call_tool("stat_path", Some(json!({ "path": path }))).await
    }
}
