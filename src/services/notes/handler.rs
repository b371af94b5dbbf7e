use std::sync::Arc;

use rmcp::model::{
    AnnotateAble, CallToolRequestParam, CallToolResult, GetPromptRequestParam, GetPromptResult,
    ListPromptsResult, ListResourcesResult, ListToolsResult, LoggingLevel,
    LoggingMessageNotificationParam, PaginatedRequestParam, Prompt, RawResource,
    ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::json;

use super::store::NoteStore;
use super::tools::{self, CREATE_NOTE, LIST_NOTES, SUMMARIZE_NOTES};
use super::types::{note_uri, CreateNoteParams, ListNotesParams, NOTE_MIME_TYPE};
use crate::mcp::tool::text_resource;
use crate::mcp::{parse_arguments, Content, ToolSpec, ValidationError};
use crate::services::{server_info, user_message};

pub const SERVER_NAME: &str = "mcp-note-server";

/// Notes server: resources to read notes, tools to create and list them,
/// and a prompt that summarizes them. Every session shares one store.
#[derive(Clone)]
pub struct NotesServer {
    store: Arc<NoteStore>,
}

impl NotesServer {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<NoteStore> {
        &self.store
    }

    pub fn tools() -> Vec<ToolSpec> {
        vec![
            ToolSpec::new::<CreateNoteParams>(CREATE_NOTE, "Create a new note"),
            ToolSpec::new::<ListNotesParams>(LIST_NOTES, "Get all the notes"),
        ]
    }
}

impl ServerHandler for NotesServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            SERVER_NAME,
            "A simple notes system: read notes as note:// resources, create and list them with tools, summarize them with a prompt.",
            ServerCapabilities::builder()
                .enable_logging()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
        )
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(
            Self::tools().iter().map(ToolSpec::to_tool).collect(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let CallToolRequestParam {
            name, arguments, ..
        } = request;

        match name.as_ref() {
            CREATE_NOTE => {
                let params: CreateNoteParams = parse_arguments(CREATE_NOTE, arguments)?;
                let notice = LoggingMessageNotificationParam {
                    level: LoggingLevel::Debug,
                    logger: None,
                    data: json!(format!("Starting create_note for {}", params.title)),
                };
                if let Err(e) = context.peer.notify_logging_message(notice).await {
                    tracing::warn!(error = %e, "failed to send log notification");
                }
                Ok(tools::create_note(&self.store, params).into())
            }
            LIST_NOTES => {
                let _: ListNotesParams = parse_arguments(LIST_NOTES, arguments)?;
                Ok(tools::list_notes(&self.store).into())
            }
            other => Err(ValidationError::UnknownTool(other.to_string()).into()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let resources = self
            .store
            .list()
            .into_iter()
            .map(|(id, note)| {
                let mut resource = RawResource::new(note_uri(&id), note.title.clone());
                resource.description = Some(format!("A text note: {}", note.title));
                resource.mime_type = Some(NOTE_MIME_TYPE.to_string());
                resource.no_annotation()
            })
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let ReadResourceRequestParam { uri, .. } = request;
        let contents = match tools::read_note(&self.store, &uri)? {
            Content::ResourceRef {
                uri,
                mime_type,
                text,
            } => text_resource(uri, mime_type, text),
            Content::Text { text } => text_resource(uri, NOTE_MIME_TYPE, text),
        };
        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult::with_all_items(vec![Prompt::new(
            SUMMARIZE_NOTES,
            Some("Summarize all notes"),
            None,
        )]))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let GetPromptRequestParam { name, .. } = request;
        if name != SUMMARIZE_NOTES {
            return Err(ErrorData::invalid_params(
                format!("Prompt not found: {name}"),
                None,
            ));
        }
        Ok(GetPromptResult {
            description: Some("Summarize all notes".to_string()),
            messages: tools::summarize_notes(&self.store)
                .into_iter()
                .map(user_message)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_specs() {
        let names: Vec<&str> = NotesServer::tools().iter().map(|t| t.name).collect();
        assert_eq!(names, vec![CREATE_NOTE, LIST_NOTES]);

        let create = &NotesServer::tools()[0];
        let required = create.input_schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("title")));
        assert!(required.contains(&json!("content")));
    }

    #[test]
    fn test_server_info() {
        let server = NotesServer::new(Arc::new(NoteStore::seeded()));
        let info = server.get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_some());
    }
}
