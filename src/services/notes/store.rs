use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::types::Note;

/// In-memory notes, keyed by sequential id. Notes are never updated or
/// deleted, so `count + 1` is always a fresh id.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: RwLock<BTreeMap<u64, Note>>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the two starter notes (ids "1" and "2")
    pub fn seeded() -> Self {
        let store = Self::new();
        store.create("First Note", "This is note 1");
        store.create("Second Note", "This is note 2");
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<u64, Note>> {
        match self.notes.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<u64, Note>> {
        match self.notes.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Insert a note and return its id
    pub fn create(&self, title: impl Into<String>, content: impl Into<String>) -> String {
        let mut notes = self.write();
        let id = notes.len() as u64 + 1;
        notes.insert(
            id,
            Note {
                title: title.into(),
                content: content.into(),
            },
        );
        id.to_string()
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        let key: u64 = id.parse().ok()?;
        self.read().get(&key).cloned()
    }

    /// All notes in ascending id order
    pub fn list(&self) -> Vec<(String, Note)> {
        self.read()
            .iter()
            .map(|(id, note)| (id.to_string(), note.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
