//! MCP Server implementation for sandboxed filesystem operations
//!
//! The server owns the operation registry and maps `tools/list` and
//! `tools/call` onto it. Nothing here touches the filesystem directly.

use std::sync::Arc;

use mcp_common::{
    async_trait, CallToolResult, EmbeddableMcp, EmbeddableResult, McpError,
    OperationDescriptor, OperationRegistry, Tool,
};
use rmcp::{
    model::{
        CallToolRequestParam, JsonObject, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    RoleServer,
};
use serde_json::Value;

use crate::config::Config;
use crate::sandbox::Sandbox;
use crate::service::FilesystemService;
use crate::storage::{LocalStorage, Storage};
use crate::tools;
use crate::types::FsResult;

const INSTRUCTIONS: &str = "Sandboxed filesystem MCP server. \
     Operations are restricted to the configured allowed directories. \
     Use list_allowed_directories to see what paths are accessible.";

/// The Filesystem MCP Server
#[derive(Clone)]
pub struct FilesystemMcpServer {
    registry: Arc<OperationRegistry<FilesystemService>>,
}

impl FilesystemMcpServer {
    /// Build a server over the local filesystem
    ///
    /// Allowed roots come from `cli_dirs` when given, else from `config`,
    /// else the working directory. Fails when any root is not a directory.
    pub fn new(config: &Config, cli_dirs: &[String]) -> FsResult<Self> {
        let roots = config.allowed_roots(cli_dirs)?;
        let sandbox = Sandbox::new(&roots)?;
        let storage = LocalStorage::new(sandbox, config.limits.clone());
        Ok(Self::from_storage(Arc::new(storage)))
    }

    /// Build a server over any storage backend
    pub fn from_storage(storage: Arc<dyn Storage>) -> Self {
        let service = Arc::new(FilesystemService::new(storage));
        Self {
            registry: Arc::new(tools::registry(service)),
        }
    }

    pub fn registry(&self) -> &OperationRegistry<FilesystemService> {
        &self.registry
    }

    /// Run one call and render the outcome, failures included
    pub async fn handle_call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let args = arguments.map(Value::Object).unwrap_or(Value::Null);
        match self.registry.invoke(name, args).await {
            Ok(output) => output.into_call_tool_result(),
            Err(e) => {
                tracing::debug!("Tool {} failed: {}", name, e);
                e.into_call_tool_result()
            }
        }
    }

    fn tools(&self) -> Vec<Tool> {
        self.registry
            .list_operations()
            .into_iter()
            .map(to_tool)
            .collect()
    }
}

fn to_tool(descriptor: OperationDescriptor) -> Tool {
    let schema = match descriptor.input_schema {
        Some(Value::Object(map)) => map,
        _ => {
            let mut map = JsonObject::new();
            map.insert("type".into(), Value::String("object".into()));
            map.insert("properties".into(), Value::Object(JsonObject::new()));
            map
        }
    };
    Tool::new(descriptor.name, descriptor.description, Arc::new(schema))
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

impl rmcp::ServerHandler for FilesystemMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.handle_call(&request.name, request.arguments).await)
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for FilesystemMcpServer {
    fn server_name(&self) -> &str {
        "sandbox-fs"
    }

    fn server_description(&self) -> Option<&str> {
        Some(INSTRUCTIONS)
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tools()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        let output = self.registry.invoke(name, params).await?;
        Ok(output.into_call_tool_result())
    }
}
