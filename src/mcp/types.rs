//! MCP Protocol Types
//!
//! The slice of JSON-RPC 2.0 and MCP the dispatcher needs to classify a
//! request, plus the content union tool handlers produce. Everything else on
//! the wire is owned by the protocol SDK.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the session id on every request after initialize
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// JSON-RPC protocol version tag
pub const JSONRPC_VERSION: &str = "2.0";

/// Client information sent in initialize request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: serde_json::Map<String, Value>,
    #[serde(rename = "clientInfo")]
    pub client_info: ClientInfo,
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Check if this is a notification (no id field)
    pub fn is_notification(&self) -> bool {
        self.id.as_ref().map_or(true, Value::is_null)
    }
}

/// Whether `body` is a well-formed MCP `initialize` request.
///
/// Batches never qualify: a session can only be opened by a single request.
pub fn is_initialize_request(body: &Value) -> bool {
    if !body.is_object() {
        return false;
    }
    let Ok(request) = serde_json::from_value::<JsonRpcRequest>(body.clone()) else {
        return false;
    };
    request.jsonrpc == JSONRPC_VERSION
        && !request.is_notification()
        && request.method == "initialize"
        && serde_json::from_value::<InitializeParams>(request.params).is_ok()
}

/// Content block produced by tool, resource and prompt handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "resource")]
    ResourceRef {
        uri: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
        text: String,
    },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    /// Text of the block, for either kind
    pub fn as_text(&self) -> &str {
        match self {
            Content::Text { text } | Content::ResourceRef { text, .. } => text,
        }
    }
}

/// Result of one tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: Vec<Content>,
}

impl ToolOutput {
    /// A single text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
        }
    }

    /// One text block per item
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: texts.into_iter().map(Content::text).collect(),
        }
    }

    /// Concatenated text of every block
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn initialize_body() -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": { "name": "inspector", "version": "0.1.0" }
            }
        })
    }

    #[test]
    fn test_initialize_request_detected() {
        assert!(is_initialize_request(&initialize_body()));
    }

    #[test]
    fn test_other_methods_are_not_initialize() {
        let mut body = initialize_body();
        body["method"] = json!("tools/list");
        assert!(!is_initialize_request(&body));
    }

    #[test]
    fn test_initialize_requires_params() {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" });
        assert!(!is_initialize_request(&body));

        let mut body = initialize_body();
        body["params"]["clientInfo"] = json!({ "name": "x" });
        assert!(!is_initialize_request(&body));
    }

    #[test]
    fn test_initialize_notification_rejected() {
        let mut body = initialize_body();
        body.as_object_mut().unwrap().remove("id");
        assert!(!is_initialize_request(&body));
    }

    #[test]
    fn test_batch_is_not_initialize() {
        assert!(!is_initialize_request(&json!([initialize_body()])));
        assert!(!is_initialize_request(&Value::Null));
    }

    #[test]
    fn test_content_serialization() {
        let text = serde_json::to_value(Content::text("hi")).unwrap();
        assert_eq!(text, json!({ "type": "text", "text": "hi" }));

        let resource = serde_json::to_value(Content::ResourceRef {
            uri: "note:///1".into(),
            mime_type: "text/plain".into(),
            text: "body".into(),
        })
        .unwrap();
        assert_eq!(resource["type"], "resource");
        assert_eq!(resource["mimeType"], "text/plain");
    }

    #[test]
    fn test_tool_output_from_texts() {
        let output = ToolOutput::from_texts(["a", "b"]);
        assert_eq!(output.content.len(), 2);
        assert_eq!(output.joined_text(), "a\nb");
    }
}
