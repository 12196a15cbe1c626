//! Result helpers for MCP tool responses
//!
//! Operation results are first reduced to a transport-neutral [`Output`]
//! (plain text or a JSON tree) and only then rendered as a `CallToolResult`.

use std::fmt::Debug;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::Value;

/// Serialized result of an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// Plain text, passed to the caller as-is
    Text(String),
    /// Structured data, rendered as pretty-printed JSON
    Structured(Value),
}

impl Output {
    /// Serialize any result value
    ///
    /// Strings stay text. Everything else goes through serde, which walks
    /// sequences, maps and structs recursively. Values serde cannot encode
    /// (for example maps with non-string keys) fall back to their debug
    /// rendering instead of failing the call.
    pub fn from_value<T: Serialize + Debug>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::String(text)) => Output::Text(text),
            Ok(other) => Output::Structured(other),
            Err(e) => {
                tracing::debug!("falling back to debug rendering: {}", e);
                Output::Text(format!("{:?}", value))
            }
        }
    }

    /// Text form of the output
    pub fn to_text(&self) -> String {
        match self {
            Output::Text(text) => text.clone(),
            Output::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    pub fn into_call_tool_result(self) -> CallToolResult {
        match self {
            Output::Text(text) => text_success(text),
            Output::Structured(_) => text_success(self.to_text()),
        }
    }
}

/// Create a successful plain text response
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Serialize)]
    struct Listing {
        path: String,
        total_count: usize,
    }

    #[test]
    fn test_string_stays_text() {
        let output = Output::from_value(&"done".to_string());
        assert_eq!(output, Output::Text("done".into()));
    }

    #[test]
    fn test_struct_flattens_to_map() {
        let output = Output::from_value(&Listing {
            path: "/tmp".into(),
            total_count: 2,
        });
        assert_eq!(
            output,
            Output::Structured(serde_json::json!({ "path": "/tmp", "total_count": 2 }))
        );
    }

    #[test]
    fn test_sequence_recurses() {
        let output = Output::from_value(&vec![1, 2, 3]);
        assert_eq!(output, Output::Structured(serde_json::json!([1, 2, 3])));
    }

    #[test]
    fn test_unencodable_value_falls_back_to_text() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        match Output::from_value(&map) {
            Output::Text(text) => assert!(text.contains("pair")),
            other => panic!("expected text fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_text_success() {
        let result = Output::Text("hello world".into()).into_call_tool_result();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }
}
