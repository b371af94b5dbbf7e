//! MCP Error Types
//!
//! JSON-RPC 2.0 compatible error codes, the fixed error envelope returned by
//! the dispatcher, and the error types surfaced at the HTTP boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::JSONRPC_VERSION;

/// Standard JSON-RPC 2.0 error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received
    ParseError = -32700,
    /// The JSON sent is not a valid Request object
    InvalidRequest = -32600,
    /// The method does not exist / is not available
    MethodNotFound = -32601,
    /// Invalid method parameter(s)
    InvalidParams = -32602,
    /// Internal JSON-RPC error
    InternalError = -32603,
    /// Implementation-defined server error (no usable session)
    ServerError = -32000,
}

/// Message sent with every session rejection on POST
pub const NO_VALID_SESSION_MESSAGE: &str = "Bad Request: No valid session ID provided";

/// Body sent with session rejections on GET and DELETE
pub const INVALID_SESSION_MESSAGE: &str = "Invalid or missing session ID";

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 error response with a null id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: String,
    pub error: JsonRpcError,
    pub id: Value,
}

impl JsonRpcErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            error: JsonRpcError {
                code: code as i32,
                message: message.into(),
                data: None,
            },
            id: Value::Null,
        }
    }

    /// `{"jsonrpc":"2.0","error":{"code":-32000,"message":"Bad Request: No valid session ID provided"},"id":null}`
    pub fn no_valid_session() -> Self {
        Self::new(ErrorCode::ServerError, NO_VALID_SESSION_MESSAGE)
    }
}

/// Errors resolved at the dispatcher boundary. Each maps to one HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// POST without a usable session that is not a fresh initialize
    #[error("Bad Request: No valid session ID provided")]
    NoValidSession,

    /// GET or DELETE with a missing or unknown session id
    #[error("Invalid or missing session ID")]
    InvalidSession,

    /// The request body could not be read
    #[error("Invalid request body: {0}")]
    Body(String),

    /// Failure while forwarding to an established transport
    #[error("Internal server error {0}")]
    Internal(String),

    /// Failure while forwarding a termination request
    #[error("Error processing session termination")]
    Termination(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoValidSession
            | DispatchError::InvalidSession
            | DispatchError::Body(_) => StatusCode::BAD_REQUEST,
            DispatchError::Internal(_) | DispatchError::Termination(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            DispatchError::NoValidSession => {
                (status, Json(JsonRpcErrorResponse::no_valid_session())).into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}

/// Tool parameter validation failures, raised before a handler runs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Arguments do not match the declared schema
    #[error("Invalid arguments for tool {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// Arguments are well-typed but violate a constraint
    #[error("Invalid arguments for tool {tool}: {message}")]
    Constraint { tool: String, message: String },

    /// No tool registered under this name
    #[error("Tool not found: {0}")]
    UnknownTool(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidParams
    }
}

impl From<ValidationError> for rmcp::ErrorData {
    fn from(e: ValidationError) -> Self {
        rmcp::ErrorData::new(
            rmcp::model::ErrorCode(e.code() as i32),
            e.to_string(),
            None,
        )
    }
}
