//! Tool servers exposed over MCP
//!
//! Each service is an rmcp `ServerHandler` built fresh for every session.
//! Tool, resource and prompt bodies live in plain functions next to it so
//! they can be tested without a protocol session.

pub mod elements;
pub mod notes;

use rmcp::model::{
    AnnotateAble, Implementation, PromptMessage, PromptMessageContent, PromptMessageRole,
    ProtocolVersion, RawContent, ServerCapabilities, ServerInfo,
};

use crate::mcp::tool::text_resource;
use crate::mcp::Content;

/// Server identity and capabilities announced in the initialize response
pub(crate) fn server_info(
    name: &str,
    instructions: &str,
    capabilities: ServerCapabilities,
) -> ServerInfo {
    let mut implementation = Implementation::from_build_env();
    implementation.name = name.to_string();
    implementation.version = env!("CARGO_PKG_VERSION").to_string();

    let mut info = ServerInfo::default();
    info.protocol_version = ProtocolVersion::V_2025_03_26;
    info.capabilities = capabilities;
    info.server_info = implementation;
    info.instructions = Some(instructions.to_string());
    info
}

/// A user prompt message carrying `content`
pub(crate) fn user_message(content: Content) -> PromptMessage {
    match content {
        Content::Text { text } => PromptMessage::new_text(PromptMessageRole::User, text),
        Content::ResourceRef {
            uri,
            mime_type,
            text,
        } => match rmcp::model::Content::resource(text_resource(uri, mime_type, text.clone())).raw
        {
            RawContent::Resource(resource) => PromptMessage {
                role: PromptMessageRole::User,
                content: PromptMessageContent::Resource {
                    resource: resource.no_annotation(),
                },
            },
            _ => PromptMessage::new_text(PromptMessageRole::User, text),
        },
    }
}
