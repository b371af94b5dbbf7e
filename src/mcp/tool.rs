//! Tool plumbing shared by every service
//!
//! A tool is a name, a description and a parameter type. Arguments are
//! checked against the parameter type (types, optionality, defaults, then
//! constraints) before the handler body runs, and the handler's
//! [`ToolOutput`] is converted into protocol content here.

use rmcp::model::{CallToolResult, JsonObject, ResourceContents, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ValidationError;
use super::schema::input_schema;
use super::types::{Content, ToolOutput};

/// Typed, validated arguments of one tool
pub trait ToolParams: DeserializeOwned + JsonSchema {
    /// Constraints the schema cannot express. The message is reported to the
    /// caller as an invalid-params error.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Decode and validate raw call arguments for `tool`
pub fn parse_arguments<P: ToolParams>(
    tool: &str,
    arguments: Option<JsonObject>,
) -> Result<P, ValidationError> {
    let raw = Value::Object(arguments.unwrap_or_default());
    let params: P =
        serde_json::from_value(raw).map_err(|e| ValidationError::InvalidArguments {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;
    params
        .validate()
        .map_err(|message| ValidationError::Constraint {
            tool: tool.to_string(),
            message,
        })?;
    Ok(params)
}

/// Static description of a tool, advertised in `tools/list`
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: std::sync::Arc<JsonObject>,
}

impl ToolSpec {
    pub fn new<P: ToolParams>(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            input_schema: input_schema::<P>(),
        }
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, self.input_schema.clone())
    }
}

/// Text resource contents with an explicit mime type
pub fn text_resource(
    uri: impl Into<String>,
    mime_type: impl Into<String>,
    text: impl Into<String>,
) -> ResourceContents {
    let mut contents = ResourceContents::text(text, uri);
    if let ResourceContents::TextResourceContents { mime_type: slot, .. } = &mut contents {
        *slot = Some(mime_type.into());
    }
    contents
}

impl From<Content> for rmcp::model::Content {
    fn from(content: Content) -> Self {
        match content {
            Content::Text { text } => rmcp::model::Content::text(text),
            Content::ResourceRef {
                uri,
                mime_type,
                text,
            } => rmcp::model::Content::resource(text_resource(uri, mime_type, text)),
        }
    }
}

impl From<ToolOutput> for CallToolResult {
    /// Handlers report collaborator failures as content, so every output is a
    /// successful call at the protocol level.
    fn from(output: ToolOutput) -> Self {
        CallToolResult::success(output.content.into_iter().map(Into::into).collect())
    }
}
