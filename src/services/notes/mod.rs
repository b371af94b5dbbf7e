mod handler;
mod store;
pub mod tools;
mod types;

pub use handler::{NotesServer, SERVER_NAME};
pub use store::NoteStore;
pub use types::{
    note_uri, parse_note_uri, CreateNoteParams, ListNotesParams, Note, NotesError, NOTE_MIME_TYPE,
    NOTE_URI_SCHEME,
};
