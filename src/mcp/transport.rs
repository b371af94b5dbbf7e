//! Session Transports
//!
//! A transport frames and streams protocol messages for exactly one session.
//! The protocol state machine lives in rmcp; this module adapts one rmcp
//! `StreamableHttpService` per session to the [`Transport`] contract the
//! registry and dispatcher rely on.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::Method;
use axum::response::Response;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::session::SessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServerHandler;

use super::state::{TransportState, TransportStateMachine};
use super::types::SESSION_ID_HEADER;

/// Invoked with the transport's own session id once it has closed
pub type CloseCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The session was closed before or while the request arrived
    #[error("session {0} is closed")]
    Closed(String),

    /// The underlying session could not be shut down
    #[error("failed to close session {session_id}: {message}")]
    Close { session_id: String, message: String },

    /// The protocol layer failed while handling a request
    #[error("{0}")]
    Protocol(String),
}

/// Protocol I/O for one session
#[async_trait]
pub trait Transport: Send + Sync {
    /// Session id, known once the initialize exchange has completed
    fn session_id(&self) -> Option<String>;

    fn is_closed(&self) -> bool;

    /// Forward one HTTP request (POST, GET or DELETE) to the protocol layer
    async fn handle_request(&self, request: Request) -> Result<Response, TransportError>;

    /// Terminate the session. Closing twice is a no-op.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Allocates transports for new sessions
pub trait TransportFactory: Send + Sync {
    fn open(&self, on_close: CloseCallback) -> Arc<dyn Transport>;
}

/// rmcp-backed transport holding a single streamable HTTP session
pub struct StreamableHttpTransport<S> {
    service: StreamableHttpService<S, LocalSessionManager>,
    sessions: Arc<LocalSessionManager>,
    session_id: OnceLock<String>,
    state: TransportStateMachine,
    on_close: CloseCallback,
}

impl<S> StreamableHttpTransport<S>
where
    S: ServerHandler + Send + 'static,
{
    pub fn new<F>(handler_factory: F, on_close: CloseCallback) -> Self
    where
        F: Fn() -> Result<S, std::io::Error> + Send + Sync + 'static,
    {
        let sessions = Arc::new(LocalSessionManager::default());
        let service = StreamableHttpService::new(
            handler_factory,
            sessions.clone(),
            StreamableHttpServerConfig::default(),
        );
        Self {
            service,
            sessions,
            session_id: OnceLock::new(),
            state: TransportStateMachine::new(),
            on_close,
        }
    }

    fn closed_error(&self) -> TransportError {
        TransportError::Closed(self.session_id().unwrap_or_default())
    }

    /// Record the id assigned by the initialize exchange
    fn on_session_initialized(&self, response: &Response) {
        if self.state.current() != TransportState::Allocated || !response.status().is_success() {
            return;
        }
        let Some(id) = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        else {
            return;
        };
        if self.session_id.set(id.to_string()).is_ok() && self.state.transition(TransportState::Open).is_ok() {
            tracing::info!(session_id = %id, "Session initialized");
        }
    }

    fn mark_closed(&self) {
        if !self.state.close() {
            return;
        }
        if let Some(id) = self.session_id.get() {
            tracing::info!(session_id = %id, "Transport closed");
            (self.on_close)(id);
        }
    }

    /// Whether rmcp still tracks the session; it may have expired on its own
    async fn session_alive(&self, id: &str) -> Result<bool, TransportError> {
        let id: Arc<str> = Arc::from(id);
        self.sessions
            .has_session(&id)
            .await
            .map_err(|e| TransportError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl<S> Transport for StreamableHttpTransport<S>
where
    S: ServerHandler + Send + 'static,
{
    fn session_id(&self) -> Option<String> {
        self.session_id.get().cloned()
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    async fn handle_request(&self, request: Request) -> Result<Response, TransportError> {
        if self.state.is_closed() {
            return Err(self.closed_error());
        }
        if let Some(id) = self.session_id.get().filter(|_| self.state.is_open()) {
            if !self.session_alive(id).await? {
                self.mark_closed();
                return Err(self.closed_error());
            }
        }

        let is_delete = request.method() == Method::DELETE;
        let response = self.service.handle(request).await.map(Body::new);

        self.on_session_initialized(&response);
        if is_delete && response.status().is_success() {
            self.mark_closed();
        }
        Ok(response)
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.state.is_closed() {
            return Ok(());
        }
        if let Some(id) = self.session_id.get() {
            let key: Arc<str> = Arc::from(id.as_str());
            self.sessions
                .close_session(&key)
                .await
                .map_err(|e| TransportError::Close {
                    session_id: id.clone(),
                    message: e.to_string(),
                })?;
        }
        self.mark_closed();
        Ok(())
    }
}

/// Builds a fresh rmcp handler for every new session
pub struct StreamableHttpTransportFactory<S> {
    handler_factory: Arc<dyn Fn() -> S + Send + Sync>,
}

impl<S> StreamableHttpTransportFactory<S>
where
    S: ServerHandler + Send + 'static,
{
    pub fn new(handler_factory: impl Fn() -> S + Send + Sync + 'static) -> Self {
        Self {
            handler_factory: Arc::new(handler_factory),
        }
    }
}

impl<S> TransportFactory for StreamableHttpTransportFactory<S>
where
    S: ServerHandler + Send + 'static,
{
    fn open(&self, on_close: CloseCallback) -> Arc<dyn Transport> {
        let factory = self.handler_factory.clone();
        Arc::new(StreamableHttpTransport::new(move || Ok(factory()), on_close))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::error::JsonRpcErrorResponse;
    use crate::mcp::{router, DispatchState, SessionRegistry};
    use crate::services::notes::{NoteStore, NotesServer};
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower::ServiceExt;

    fn mcp_request(method: Method, session: Option<&str>, body: Option<serde_json::Value>) -> Request {
        let mut builder = Request::builder()
            .method(method)
            .uri("/mcp")
            .header("host", "localhost")
            .header("accept", "application/json, text/event-stream");
        if let Some(id) = session {
            builder = builder.header(SESSION_ID_HEADER, id);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn initialize() -> Request {
        mcp_request(
            Method::POST,
            None,
            Some(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": { "name": "transport-test", "version": "1.0.0" }
                }
            })),
        )
    }

    fn notes_transport(on_close: CloseCallback) -> StreamableHttpTransport<NotesServer> {
        let store = Arc::new(NoteStore::seeded());
        StreamableHttpTransport::new(move || Ok(NotesServer::new(store.clone())), on_close)
    }

    async fn drop_sdk_session(transport: &StreamableHttpTransport<NotesServer>, id: &str) {
        let key: Arc<str> = Arc::from(id);
        transport.sessions.close_session(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_session_dropped_by_sdk_closes_transport() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let transport = notes_transport(Arc::new(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let response = transport.handle_request(initialize()).await.unwrap();
        assert!(response.status().is_success());
        let id = transport.session_id().unwrap();
        assert!(transport.state.is_open());

        drop_sdk_session(&transport, &id).await;

        let err = transport
            .handle_request(mcp_request(Method::GET, Some(&id), None))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Closed(ref closed) if closed == &id));
        assert!(transport.is_closed());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        transport.close().await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    /// Hands out notes transports and keeps a typed handle to each
    struct RecordingFactory {
        store: Arc<NoteStore>,
        opened: Mutex<Vec<Arc<StreamableHttpTransport<NotesServer>>>>,
    }

    impl TransportFactory for RecordingFactory {
        fn open(&self, on_close: CloseCallback) -> Arc<dyn Transport> {
            let store = self.store.clone();
            let transport = Arc::new(StreamableHttpTransport::new(
                move || Ok(NotesServer::new(store.clone())),
                on_close,
            ));
            self.opened.lock().unwrap().push(transport.clone());
            transport
        }
    }

    #[tokio::test]
    async fn test_session_dropped_by_sdk_leaves_registry() {
        let factory = Arc::new(RecordingFactory {
            store: Arc::new(NoteStore::seeded()),
            opened: Mutex::new(Vec::new()),
        });
        let registry = SessionRegistry::new(factory.clone());
        let app = router(DispatchState::new(registry.clone()));

        let response = app.clone().oneshot(initialize()).await.unwrap();
        assert!(response.status().is_success());
        let id = response.headers()[SESSION_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();
        assert!(registry.contains(&id));

        let transport = factory.opened.lock().unwrap()[0].clone();
        drop_sdk_session(&transport, &id).await;

        let response = app
            .oneshot(mcp_request(
                Method::POST,
                Some(&id),
                Some(serde_json::json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            body,
            serde_json::to_vec(&JsonRpcErrorResponse::no_valid_session()).unwrap()
        );
        assert!(!registry.contains(&id));
        assert!(registry.is_empty());
    }
}
