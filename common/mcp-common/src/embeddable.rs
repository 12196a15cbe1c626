//! Embeddable MCP trait for in-process execution
//!
//! This module provides the [`EmbeddableMcp`] trait that allows MCP servers
//! to be executed directly in-process without subprocess spawning or IPC.
//! Servers built on an [`OperationRegistry`](crate::OperationRegistry) get
//! both methods almost for free by delegating to the registry.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let server = SomeMcpServer::new(config)?;
//! let tools = server.list_tools();
//! let result = server.call_tool("list_directory", serde_json::json!({ "path": "." })).await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

use crate::error::DispatchError;

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, DispatchError>;

/// Trait for MCP servers that can be executed in-process
///
/// Implementations must be `Send + Sync` to support concurrent tool calls
/// from multiple async tasks.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Returns the server name for identification
    fn server_name(&self) -> &str;

    /// Returns a list of all available tools
    ///
    /// Each tool includes its name, description, and input schema.
    fn list_tools(&self) -> Vec<Tool>;

    /// Executes a tool by name with the given parameters
    ///
    /// Fails with [`DispatchError::UnknownOperation`] for unregistered names,
    /// [`DispatchError::Validation`] for malformed parameters, and
    /// [`DispatchError::OperationFailed`] when the tool itself fails.
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// Returns an optional description of the server
    fn server_description(&self) -> Option<&str> {
        None
    }
}
