//! Notes tools, resource reads and the summarize prompt, independent of the
//! protocol SDK.

use super::store::NoteStore;
use super::types::{
    note_uri, parse_note_uri, CreateNoteParams, NotesError, NOTE_MIME_TYPE,
};
use crate::mcp::{Content, ToolOutput};

pub const CREATE_NOTE: &str = "create_note";
pub const LIST_NOTES: &str = "list_notes";
pub const SUMMARIZE_NOTES: &str = "summarize_notes";

pub fn create_note(store: &NoteStore, params: CreateNoteParams) -> ToolOutput {
    let id = store.create(params.title.clone(), params.content);
    tracing::debug!(note_id = %id, title = %params.title, "Created note");
    ToolOutput::text(format!("Created note {id}: {}", params.title))
}

/// One text block per note
pub fn list_notes(store: &NoteStore) -> ToolOutput {
    ToolOutput::from_texts(store.list().into_iter().map(|(id, note)| {
        format!("id:{id}, title:{}, content:{}", note.title, note.content)
    }))
}

/// Contents of the note behind `uri`
pub fn read_note(store: &NoteStore, uri: &str) -> Result<Content, NotesError> {
    let id = parse_note_uri(uri).ok_or_else(|| NotesError::InvalidUri(uri.to_string()))?;
    let note = store
        .get(id)
        .ok_or_else(|| NotesError::NotFound(id.to_string()))?;
    Ok(Content::ResourceRef {
        uri: uri.to_string(),
        mime_type: NOTE_MIME_TYPE.to_string(),
        text: note.content,
    })
}

/// User messages asking for a summary, with every note embedded as a resource
pub fn summarize_notes(store: &NoteStore) -> Vec<Content> {
    let mut messages = vec![Content::text("Please summarize the following notes:")];
    messages.extend(store.list().into_iter().map(|(id, note)| Content::ResourceRef {
        uri: note_uri(&id),
        mime_type: NOTE_MIME_TYPE.to_string(),
        text: note.content,
    }));
    messages.push(Content::text(
        "Provide a concise summary of all the notes above.",
    ));
    messages
}
