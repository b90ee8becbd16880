//! Task domain model.
//!
//! # Responsibility
//! - Define the board card record and its status/priority enums.
//! - Own label normalization shared by operations and filters.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `done` is true iff `status == TaskStatus::Done`.
//! - `category` is `None` or a non-empty, whitespace-collapsed label.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for tasks and notes.
///
/// Kept as a string because legacy documents carry `Date.now()` style ids.
pub type RecordId = String;

/// Board column a task currently sits in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Wire label used in the persisted document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Parses a wire label. Unknown labels return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Task priority. Cycles `High -> Medium -> Low -> High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Next priority in the fixed cycle order.
    pub fn next(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low => Self::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Parses a wire label. Unknown labels return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Board card record as persisted in the widget document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    pub category: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Mirrors `status == Done`; kept on the wire for older readers.
    pub done: bool,
    /// Unix epoch milliseconds.
    pub created: i64,
}

impl Task {
    /// Creates a fresh `todo` task with a generated UUID id.
    ///
    /// # Invariants
    /// - `status` starts as `Todo` and `done` as `false`.
    /// - Callers are expected to pass an already trimmed title.
    pub fn new(
        title: impl Into<String>,
        category: Option<String>,
        priority: Priority,
        created: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            category,
            status: TaskStatus::Todo,
            priority,
            done: false,
            created,
        }
    }

    /// Moves the task to `status`, keeping `done` coupled.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.done = status == TaskStatus::Done;
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Normalizes a free-text category label.
///
/// Trims, collapses internal whitespace runs, and maps empty input to `None`.
pub fn normalize_category(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_category, Priority, Task, TaskStatus};

    #[test]
    fn priority_cycle_returns_to_start_after_three_steps() {
        for start in [Priority::High, Priority::Medium, Priority::Low] {
            assert_eq!(start.next().next().next(), start);
        }
        assert_eq!(Priority::High.next(), Priority::Medium);
        assert_eq!(Priority::Low.next(), Priority::High);
    }

    #[test]
    fn set_status_keeps_done_flag_coupled() {
        let mut task = Task::new("ship", None, Priority::default(), 0);
        task.set_status(TaskStatus::Done);
        assert!(task.done);
        task.set_status(TaskStatus::InProgress);
        assert!(!task.done);
    }

    #[test]
    fn normalize_category_collapses_whitespace_and_drops_empty() {
        assert_eq!(
            normalize_category(Some("  deep   work ")).as_deref(),
            Some("deep work")
        );
        assert_eq!(normalize_category(Some("   ")), None);
        assert_eq!(normalize_category(None), None);
    }

    #[test]
    fn status_wire_labels_match_serde() {
        for status in TaskStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("archived"), None);
    }
}
