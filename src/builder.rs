//! Server builders - wire a service into a routable MCP endpoint
//!
//! handler factory → transport factory → session registry → `/mcp` router.
//! Both binaries and the integration tests go through here.

use std::sync::Arc;

use axum::Router;

use crate::config::ServerConfig;
use crate::mcp::{router, DispatchState, SessionRegistry, StreamableHttpTransportFactory};
use crate::services::elements::{ApiError, ElementsApi, ElementsServer, HttpElementsApi};
use crate::services::notes::{NoteStore, NotesServer};

/// A router together with the registry behind it, so the caller can close
/// every session on shutdown
pub struct McpApp {
    pub router: Router,
    pub registry: Arc<SessionRegistry>,
}

fn build_app(registry: Arc<SessionRegistry>, config: &ServerConfig) -> McpApp {
    let state = DispatchState::new(registry.clone()).with_max_body_bytes(config.max_body_bytes);
    McpApp {
        router: router(state),
        registry,
    }
}

/// Notes server over a fresh seeded store
pub fn build_notes_router(config: &ServerConfig) -> McpApp {
    build_notes_router_with_store(config, Arc::new(NoteStore::seeded()))
}

/// Notes server over `store`; every session sees the same notes
pub fn build_notes_router_with_store(config: &ServerConfig, store: Arc<NoteStore>) -> McpApp {
    let factory = StreamableHttpTransportFactory::new(move || NotesServer::new(store.clone()));
    build_app(SessionRegistry::new(Arc::new(factory)), config)
}

/// Elements server calling the Affinidi APIs at `config.api_base_url`
pub fn build_elements_router(config: &ServerConfig) -> Result<McpApp, ApiError> {
    let api = HttpElementsApi::new(config.api_base_url.clone(), config.request_timeout())?;
    tracing::debug!(base_url = %api.base_url(), "Affinidi API client ready");
    Ok(build_elements_router_with_api(config, Arc::new(api)))
}

/// Elements server over any [`ElementsApi`] implementation
pub fn build_elements_router_with_api(config: &ServerConfig, api: Arc<dyn ElementsApi>) -> McpApp {
    let factory = StreamableHttpTransportFactory::new(move || ElementsServer::new(api.clone()));
    build_app(SessionRegistry::new(Arc::new(factory)), config)
}
