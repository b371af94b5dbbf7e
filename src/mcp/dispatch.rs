//! Request Dispatcher
//!
//! HTTP endpoint logic for `/mcp`. Every request is classified into exactly
//! one outcome, evaluated in order:
//!
//! 1. session header present and registered → forward to that transport
//! 2. no session header and the body is an `initialize` request → open a new
//!    session and forward to it (POST only)
//! 3. anything else → reject with 400
//!
//! Errors are resolved here; nothing escapes the HTTP handler.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use serde_json::Value;

use super::error::DispatchError;
use super::registry::SessionRegistry;
use super::transport::{Transport, TransportError};
use super::types::{is_initialize_request, SESSION_ID_HEADER};

/// Default cap on POST bodies
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Shared state of the `/mcp` routes
#[derive(Clone)]
pub struct DispatchState {
    pub registry: Arc<SessionRegistry>,
    pub max_body_bytes: usize,
}

impl DispatchState {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// `POST|GET|DELETE /mcp`
pub fn router(state: DispatchState) -> Router {
    Router::new()
        .route(
            "/mcp",
            post(handle_post).get(handle_get).delete(handle_delete),
        )
        .with_state(state)
}

/// What the client sent in the session header
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionHeader {
    /// Missing, or present with an empty value
    Absent,
    Present(String),
    /// Present but not visible ASCII; can never name a session
    Unreadable,
}

fn session_header(headers: &HeaderMap) -> SessionHeader {
    match headers.get(SESSION_ID_HEADER) {
        None => SessionHeader::Absent,
        Some(value) if value.is_empty() => SessionHeader::Absent,
        Some(value) => value
            .to_str()
            .map_or(SessionHeader::Unreadable, |id| SessionHeader::Present(id.to_owned())),
    }
}

/// Registered transport for the request's session, if any
fn lookup(state: &DispatchState, headers: &HeaderMap) -> Option<Arc<dyn Transport>> {
    match session_header(headers) {
        SessionHeader::Present(id) => state.registry.get(&id),
        SessionHeader::Absent | SessionHeader::Unreadable => None,
    }
}

async fn handle_post(
    State(state): State<DispatchState>,
    request: Request,
) -> Result<Response, DispatchError> {
    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| DispatchError::Body(e.to_string()))?;
    let message: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    tracing::debug!(body = %message, "Received MCP request");

    match session_header(&parts.headers) {
        SessionHeader::Present(id) => {
            let request = Request::from_parts(parts, Body::from(bytes));
            let transport = state
                .registry
                .get(&id)
                .ok_or(DispatchError::NoValidSession)?;
            transport
                .handle_request(request)
                .await
                .map_err(|e| post_error(&e))
        }
        SessionHeader::Absent if is_initialize_request(&message) => {
            // an empty header must not reach the new transport as a session id
            parts.headers.remove(SESSION_ID_HEADER);
            let request = Request::from_parts(parts, Body::from(bytes));
            let pending = state.registry.create();
            let response = pending
                .transport()
                .handle_request(request)
                .await
                .map_err(|e| post_error(&e))?;
            if state.registry.commit(pending).is_none() {
                tracing::warn!(
                    status = %response.status(),
                    "initialize request did not open a session"
                );
            }
            Ok(response)
        }
        SessionHeader::Absent | SessionHeader::Unreadable => Err(DispatchError::NoValidSession),
    }
}

fn post_error(e: &TransportError) -> DispatchError {
    match e {
        TransportError::Closed(_) => DispatchError::NoValidSession,
        other => {
            tracing::error!(error = %other, "Error handling MCP request");
            DispatchError::Internal(other.to_string())
        }
    }
}

/// Open or resume the server-to-client stream of an existing session
async fn handle_get(
    State(state): State<DispatchState>,
    request: Request,
) -> Result<Response, DispatchError> {
    let transport = lookup(&state, request.headers()).ok_or(DispatchError::InvalidSession)?;
    transport
        .handle_request(request)
        .await
        .map_err(|e| match e {
            TransportError::Closed(_) => DispatchError::InvalidSession,
            other => {
                tracing::error!(error = %other, "Error handling MCP stream request");
                DispatchError::Internal(other.to_string())
            }
        })
}

/// Terminate an existing session
async fn handle_delete(
    State(state): State<DispatchState>,
    request: Request,
) -> Result<Response, DispatchError> {
    let transport = lookup(&state, request.headers()).ok_or(DispatchError::InvalidSession)?;
    if let Some(id) = transport.session_id() {
        tracing::info!(session_id = %id, "Received session termination request");
    }
    transport
        .handle_request(request)
        .await
        .map_err(|e| match e {
            TransportError::Closed(_) => DispatchError::InvalidSession,
            other => {
                tracing::error!(error = %other, "Error handling session termination");
                DispatchError::Termination(other.to_string())
            }
        })
}
