use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::mcp::ToolParams;

/// URI scheme under which notes are exposed as resources
pub const NOTE_URI_SCHEME: &str = "note://";

pub const NOTE_MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub content: String,
}

/// Canonical resource URI of a note
pub fn note_uri(id: &str) -> String {
    format!("{NOTE_URI_SCHEME}/{id}")
}

/// Note id from `note://<id>` or `note:///<id>`
pub fn parse_note_uri(uri: &str) -> Option<&str> {
    let id = uri.strip_prefix(NOTE_URI_SCHEME)?.trim_start_matches('/');
    (!id.is_empty()).then_some(id)
}

#[derive(Debug, thiserror::Error)]
pub enum NotesError {
    #[error("Note {0} not found")]
    NotFound(String),

    #[error("Not a note URI: {0}")]
    InvalidUri(String),
}

impl From<NotesError> for rmcp::ErrorData {
    fn from(e: NotesError) -> Self {
        match e {
            NotesError::NotFound(_) => rmcp::ErrorData::resource_not_found(e.to_string(), None),
            NotesError::InvalidUri(_) => rmcp::ErrorData::invalid_params(e.to_string(), None),
        }
    }
}

/// Arguments of `create_note`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateNoteParams {
    /// Title of the note
    pub title: String,
    /// Text content of the note
    pub content: String,
}

impl ToolParams for CreateNoteParams {
    fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() || self.content.is_empty() {
            return Err("Title and content are required".to_string());
        }
        Ok(())
    }
}

/// `list_notes` takes no arguments
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListNotesParams {}

impl ToolParams for ListNotesParams {}
