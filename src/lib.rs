//! Streamable HTTP MCP servers
//!
//! Two services share this library: a notes server and an Affinidi Elements
//! tool server. Each runs a session registry and request dispatcher in front
//! of rmcp's streamable HTTP transport.

pub mod builder;
pub mod config;
pub mod mcp;
pub mod server;
pub mod services;

pub use builder::{build_elements_router, build_notes_router, McpApp};
pub use config::{ServerArgs, ServerConfig};
