//! Note domain model.
//!
//! # Invariants
//! - `updated >= created`.
//! - A note with empty title and body is a draft and displays as "Untitled".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::RecordId;

/// Display title used for notes without a title.
pub const UNTITLED_NOTE_TITLE: &str = "Untitled";

/// Freeform note record as persisted in the widget document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub body: String,
    /// Unix epoch milliseconds.
    pub created: i64,
    /// Unix epoch milliseconds. Never earlier than `created`.
    pub updated: i64,
}

impl Note {
    /// Creates an empty draft note stamped at `now`.
    pub fn draft(now: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            body: String::new(),
            created: now,
            updated: now,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }

    /// Title shown in note lists.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED_NOTE_TITLE
        } else {
            self.title.as_str()
        }
    }

    /// Case-insensitive substring match over title and body.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self.body.to_lowercase().contains(needle_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, UNTITLED_NOTE_TITLE};

    #[test]
    fn draft_starts_empty_with_equal_timestamps() {
        let note = Note::draft(1_700_000_000_000);
        assert!(note.is_draft());
        assert_eq!(note.created, note.updated);
        assert_eq!(note.display_title(), UNTITLED_NOTE_TITLE);
    }

    #[test]
    fn matches_ignores_case() {
        let mut note = Note::draft(0);
        note.title = "Groceries".to_string();
        note.body = "Buy OAT milk".to_string();
        assert!(note.matches("oat"));
        assert!(note.matches("grocer"));
        assert!(!note.matches("coffee"));
    }
}
