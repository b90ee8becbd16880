//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/save/delete APIs over the store-owned document.
//! - Provide case-insensitive note search for the note list filter.
//!
//! # Invariants
//! - Saving with an empty trimmed title never changes state.
//! - Saving unchanged content is a no-op (no `updated` bump, no write), so
//!   back-to-back debounced autosaves are harmless.
//! - `updated` never drops below `created`.

use crate::clock::Clock;
use crate::model::note::Note;
use crate::store::backend::DocumentBackend;
use crate::store::StateStore;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected note input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteServiceError {
    /// Title is empty after trimming.
    EmptyTitle,
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
        }
    }
}

impl Error for NoteServiceError {}

/// Note operations over a borrowed store.
pub struct NoteService<'s, B: DocumentBackend, C: Clock> {
    store: &'s mut StateStore<B, C>,
}

impl<'s, B: DocumentBackend, C: Clock> NoteService<'s, B, C> {
    pub fn new(store: &'s mut StateStore<B, C>) -> Self {
        Self { store }
    }

    /// Creates an empty draft note at the front of the list.
    pub fn create_note(&mut self) -> Note {
        let note = Note::draft(self.store.now_ms());
        self.store.state_mut().notes.insert(0, note.clone());
        self.store.persist();
        info!("event=note_create module=note_service status=ok");
        note
    }

    /// Saves title and body for one note.
    ///
    /// # Contract
    /// - Empty trimmed title returns `EmptyTitle`.
    /// - Unknown id returns `Ok(None)`.
    /// - Title is stored trimmed; body is stored as given.
    pub fn save_note(
        &mut self,
        id: &str,
        title: &str,
        body: &str,
    ) -> Result<Option<Note>, NoteServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NoteServiceError::EmptyTitle);
        }

        let now = self.store.now_ms();
        let Some(note) = self
            .store
            .state_mut()
            .notes
            .iter_mut()
            .find(|note| note.id == id)
        else {
            return Ok(None);
        };

        if note.title == title && note.body == body {
            debug!("event=note_save module=note_service status=skip reason=unchanged");
            return Ok(Some(note.clone()));
        }

        note.title = title.to_string();
        note.body = body.to_string();
        note.updated = now.max(note.created);
        let saved = note.clone();
        self.store.persist();

        info!(
            "event=note_save module=note_service status=ok body_chars={}",
            saved.body.chars().count()
        );
        Ok(Some(saved))
    }

    /// Removes a note by id. Unknown ids are a no-op.
    pub fn delete_note(&mut self, id: &str) -> Option<Note> {
        let notes = &mut self.store.state_mut().notes;
        let index = notes.iter().position(|note| note.id == id)?;
        let removed = notes.remove(index);
        self.store.persist();
        info!("event=note_delete module=note_service status=ok");
        Some(removed)
    }
}

/// Filters notes by case-insensitive substring over title and body.
///
/// A blank query returns every note in list order.
pub fn search_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return notes.iter().collect();
    }
    notes.iter().filter(|note| note.matches(&needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::{search_notes, NoteService, NoteServiceError};
    use crate::clock::ManualClock;
    use crate::config::StoreConfig;
    use crate::model::note::Note;
    use crate::store::backend::MemoryBackend;
    use crate::store::StateStore;

    fn store() -> StateStore<MemoryBackend, ManualClock> {
        StateStore::open_with_clock(
            MemoryBackend::new(),
            StoreConfig::default(),
            ManualClock::new(10),
        )
    }

    #[test]
    fn save_rejects_blank_title_without_touching_note() {
        let mut store = store();
        let mut service = NoteService::new(&mut store);
        let draft = service.create_note();

        let err = service.save_note(&draft.id, "  ", "body").unwrap_err();
        assert_eq!(err, NoteServiceError::EmptyTitle);
        assert_eq!(store.state().notes[0], draft);
    }

    #[test]
    fn redundant_save_keeps_updated_timestamp() {
        let mut store = store();
        let draft = NoteService::new(&mut store).create_note();

        store.clock().set(20);
        let first = NoteService::new(&mut store)
            .save_note(&draft.id, " Plan ", "body")
            .unwrap()
            .unwrap();
        assert_eq!(first.title, "Plan");
        assert_eq!(first.updated, 20);

        store.clock().set(30);
        let second = NoteService::new(&mut store)
            .save_note(&draft.id, "Plan", "body")
            .unwrap()
            .unwrap();
        assert_eq!(second.updated, 20);
    }

    #[test]
    fn save_and_delete_unknown_ids_are_no_ops() {
        let mut store = store();
        let mut service = NoteService::new(&mut store);
        assert_eq!(service.save_note("missing", "t", "b"), Ok(None));
        assert_eq!(service.delete_note("missing"), None);
    }

    #[test]
    fn search_matches_title_or_body_case_insensitively() {
        let mut alpha = Note::draft(0);
        alpha.title = "Alpha".to_string();
        let mut beta = Note::draft(0);
        beta.body = "contains ALPHA too".to_string();
        let gamma = Note::draft(0);
        let notes = vec![alpha, beta, gamma];

        assert_eq!(search_notes(&notes, "alpha").len(), 2);
        assert_eq!(search_notes(&notes, "   ").len(), 3);
        assert!(search_notes(&notes, "zeta").is_empty());
    }
}
