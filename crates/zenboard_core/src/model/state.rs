//! Root aggregate persisted as one widget document.
//!
//! # Invariants
//! - `stats_history` is ordered by timestamp and holds at most
//!   `STATS_HISTORY_CAP` entries.
//! - `selected_category` is `None` for the "all" filter.

use serde::{Deserialize, Serialize};

use super::note::Note;
use super::task::Task;

/// Maximum number of retained stats snapshots.
pub const STATS_HISTORY_CAP: usize = 20;

/// One recorded completed-task count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub done_count: usize,
}

/// The single persisted widget document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Most-recent-first.
    pub tasks: Vec<Task>,
    /// Most-recent-first.
    pub notes: Vec<Note>,
    pub stats_history: Vec<StatsSnapshot>,
    pub selected_category: Option<String>,
}

impl AppState {
    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_done()).count()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;

    #[test]
    fn serializes_with_camel_case_document_keys() {
        let json = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tasks": [],
                "notes": [],
                "statsHistory": [],
                "selectedCategory": null
            })
        );
    }
}
