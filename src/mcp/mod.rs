//! MCP (Model Context Protocol) Interface
//!
//! Serves MCP over Streamable HTTP. The protocol state machine is rmcp's;
//! this module owns what sits around it.
//!
//! ## Modules
//!
//! - [`registry`] - session id → transport map with two-phase creation
//! - [`dispatch`] - `/mcp` routes and the create/reuse/reject decision
//! - [`transport`] - the transport contract and its rmcp implementation
//! - [`state`] - transport lifecycle (Allocated → Open → Closed)
//! - [`tool`] / [`schema`] - validated tool arguments and input schemas
//! - [`error`] - JSON-RPC error codes and HTTP boundary errors
//! - [`types`] - request classification and the content union

pub mod dispatch;
pub mod error;
pub mod registry;
pub mod schema;
pub mod state;
pub mod tool;
pub mod transport;
pub mod types;

pub use dispatch::{router, DispatchState};
pub use error::{DispatchError, ErrorCode, JsonRpcError, JsonRpcErrorResponse, ValidationError};
pub use registry::{PendingSession, SessionRegistry, ShutdownReport};
pub use state::{TransportState, TransportStateError, TransportStateMachine};
pub use tool::{parse_arguments, ToolParams, ToolSpec};
pub use transport::{
    CloseCallback, StreamableHttpTransport, StreamableHttpTransportFactory, Transport,
    TransportError, TransportFactory,
};
pub use types::{is_initialize_request, Content, ToolOutput, SESSION_ID_HEADER};
