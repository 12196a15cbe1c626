//! MCP Common - Shared utilities for MCP servers
//!
//! - **Initialization**: tracing setup and [`serve_stdio`]
//! - **Registry**: [`OperationRegistry`], an explicit name → handler table
//!   with schema-derived argument validation
//! - **Errors**: [`DispatchError`] and the [`OperationFailure`] trait that
//!   reduces handler errors to stable kinds
//! - **Results**: [`Output`], the transport-neutral serialized result
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process execution
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{init_tracing, serve_stdio};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     init_tracing("my_mcp", 0)?;
//!     serve_stdio(MyServer::new(), "my_mcp").await
//! }
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod registry;
pub mod result;
pub mod validate;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableMcp, EmbeddableResult};
pub use error::{DispatchError, ErrorPayload, OperationFailure};
pub use init::{init_tracing, serve_stdio};
pub use registry::{OperationDescriptor, OperationRegistry};
pub use result::{text_success, Output};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
