//! Sandboxed Filesystem MCP Library
//!
//! Filesystem operations confined to a fixed set of allowed directories,
//! exposed as MCP tools through an explicit operation registry.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use sandbox_fs_mcp::{Config, FilesystemMcpServer};
//! use mcp_common::EmbeddableMcp;
//!
//! let server = FilesystemMcpServer::new(&Config::default(), &["/srv/data".into()])?;
//! let result = server
//!     .call_tool("list_directory", serde_json::json!({ "path": "/srv/data" }))
//!     .await?;
//! ```

pub mod config;
pub mod edit;
pub mod info;
pub mod params;
pub mod sandbox;
pub mod server;
pub mod service;
pub mod storage;
pub mod tools;
pub mod types;

// Re-export main server type
pub use server::FilesystemMcpServer;

pub use config::Config;
pub use sandbox::{validate_path, Sandbox, ValidatedPath};
pub use service::FilesystemService;
pub use storage::{LocalStorage, Storage};
pub use types::{FsError, FsResult};

// Re-export parameter types for direct API usage
pub use params::*;
