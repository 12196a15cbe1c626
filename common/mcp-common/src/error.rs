//! Error handling utilities for MCP servers
//!
//! Failures crossing the dispatch boundary are reduced to a stable `kind`
//! string plus a message, so transports can branch on the kind without
//! parsing prose and without seeing a server's internal error types.

use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};

/// Kind reported when an operation name is not registered
pub const UNKNOWN_OPERATION: &str = "UnknownOperation";

/// Kind reported when arguments do not match the operation's shape
pub const VALIDATION_ERROR: &str = "ValidationError";

/// Catch-all kind for unexpected runtime failures
pub const OPERATION_ERROR: &str = "OperationError";

/// Implemented by the error types operation handlers return
///
/// The dispatcher only ever forwards `kind()` and the `Display` text; the
/// concrete error type stays inside the server crate.
///
/// ```rust,ignore
/// impl OperationFailure for MyError {
///     fn kind(&self) -> &'static str {
///         match self {
///             MyError::Missing(_) => "NotFound",
///             _ => mcp_common::error::OPERATION_ERROR,
///         }
///     }
/// }
/// ```
pub trait OperationFailure: std::error::Error {
    /// Stable, machine-readable error kind
    fn kind(&self) -> &'static str;
}

/// Error returned by [`crate::OperationRegistry::invoke`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid arguments for {operation}: {}", violations.join("; "))]
    Validation {
        operation: String,
        violations: Vec<String>,
    },

    #[error("{operation} failed: {message}")]
    OperationFailed {
        operation: String,
        kind: &'static str,
        message: String,
    },
}

impl DispatchError {
    /// Wrap a handler failure, keeping only its kind and message
    pub fn failed<E: OperationFailure>(operation: &str, err: &E) -> Self {
        DispatchError::OperationFailed {
            operation: operation.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Stable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::UnknownOperation(_) => UNKNOWN_OPERATION,
            DispatchError::Validation { .. } => VALIDATION_ERROR,
            DispatchError::OperationFailed { kind, .. } => *kind,
        }
    }

    /// Name of the operation the error belongs to
    pub fn operation(&self) -> &str {
        match self {
            DispatchError::UnknownOperation(name) => name,
            DispatchError::Validation { operation, .. }
            | DispatchError::OperationFailed { operation, .. } => operation,
        }
    }

    /// Structured payload handed to the transport
    pub fn payload(&self) -> ErrorPayload {
        let (message, violations) = match self {
            DispatchError::Validation { violations, .. } => {
                ("invalid arguments".to_string(), violations.clone())
            }
            DispatchError::OperationFailed { message, .. } => (message.clone(), Vec::new()),
            DispatchError::UnknownOperation(_) => (self.to_string(), Vec::new()),
        };

        ErrorPayload {
            error: self.kind().to_string(),
            operation: self.operation().to_string(),
            message,
            violations,
        }
    }

    /// Render as an MCP tool result flagged with `is_error`
    pub fn into_call_tool_result(self) -> CallToolResult {
        let payload = self.payload();
        let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| self.to_string());
        CallToolResult::error(vec![Content::text(text)])
    }
}

/// Transport-neutral error body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub operation: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}
