//! Persisted document migration.
//!
//! # Responsibility
//! - Upgrade any historical widget document into the current `AppState`.
//! - Classify task records into a closed set of recognized shapes.
//! - Assemble the first-release split documents into one document.
//!
//! # Invariants
//! - Migration is total: it never panics and never returns an error.
//! - Migration is idempotent on its own serialized output.
//! - Upgrade is destructive: the legacy `column` key is never written back.
//!
//! # See also
//! - crate::store for when migration runs.

use crate::model::note::Note;
use crate::model::state::{AppState, StatsSnapshot, STATS_HISTORY_CAP};
use crate::model::task::{normalize_category, Priority, Task, TaskStatus};
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// Counters describing what one migration pass had to repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Task records upgraded from the legacy `column` shape.
    pub legacy_tasks: usize,
    /// Task/note/snapshot entries dropped as structurally invalid.
    pub dropped_records: usize,
    /// Records that received a fresh id (missing or duplicate).
    pub reassigned_ids: usize,
}

/// Recognized historical task shapes.
///
/// Shape is inferred structurally because the document carries no version tag.
#[derive(Debug, Clone, Copy)]
enum TaskShape<'a> {
    /// Record already carries a `status` field.
    Current {
        record: &'a Map<String, Value>,
        status: Option<TaskStatus>,
    },
    /// First-release record keyed by a single `column` value.
    LegacyColumn {
        record: &'a Map<String, Value>,
        column: Option<&'a str>,
    },
}

impl<'a> TaskShape<'a> {
    fn classify(record: &'a Map<String, Value>) -> Self {
        match record.get("status") {
            Some(value) if !value.is_null() => Self::Current {
                record,
                status: value.as_str().and_then(TaskStatus::parse),
            },
            _ => Self::LegacyColumn {
                record,
                column: record.get("column").and_then(Value::as_str),
            },
        }
    }

    fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyColumn { .. })
    }

    /// Resolves `(status, category)` for this shape.
    fn status_and_category(&self) -> (TaskStatus, Option<String>) {
        match *self {
            Self::Current { record, status } => {
                (status.unwrap_or_default(), category_field(record))
            }
            Self::LegacyColumn { record, column } => {
                let previous_category = category_field(record);
                match column {
                    Some(label) => match TaskStatus::parse(label) {
                        Some(status) => (status, previous_category),
                        None if label.trim().is_empty() => {
                            (legacy_done_status(record), previous_category)
                        }
                        None => (legacy_done_status(record), normalize_category(Some(label))),
                    },
                    None => (legacy_done_status(record), previous_category),
                }
            }
        }
    }
}

/// Upgrades a decoded document value into the current `AppState`.
pub fn migrate(raw: &Value) -> AppState {
    migrate_with_report(raw).0
}

/// Parses document text and migrates it.
///
/// Unparseable text degrades to an empty state.
pub fn migrate_document(text: &str) -> AppState {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => migrate(&value),
        Err(err) => {
            warn!(
                "event=state_migrate module=migration status=fallback reason=parse_error line={} column={}",
                err.line(),
                err.column()
            );
            AppState::default()
        }
    }
}

/// Migrates and reports what had to be repaired.
pub fn migrate_with_report(raw: &Value) -> (AppState, MigrationReport) {
    let mut report = MigrationReport::default();
    let Some(root) = raw.as_object() else {
        if !raw.is_null() {
            warn!("event=state_migrate module=migration status=fallback reason=non_object_root");
        }
        return (AppState::default(), report);
    };

    let tasks = migrate_tasks(array_field(root, "tasks"), &mut report);
    let notes = migrate_notes(array_field(root, "notes"), &mut report);
    let stats_history = migrate_stats_history(array_field(root, "statsHistory"), &mut report);
    let selected_category = string_field(root, "selectedCategory");

    if report != MigrationReport::default() {
        info!(
            "event=state_migrate module=migration status=ok legacy_tasks={} dropped_records={} reassigned_ids={}",
            report.legacy_tasks, report.dropped_records, report.reassigned_ids
        );
    }

    (
        AppState {
            tasks,
            notes,
            stats_history,
            selected_category,
        },
        report,
    )
}

/// Builds one document from the first-release split storage keys.
///
/// Each input is the raw text stored under the legacy board/notes key; an
/// absent or unparseable value contributes an empty collection.
pub fn assemble_legacy_document(board: Option<&str>, notes: Option<&str>) -> Value {
    let mut root = Map::new();
    root.insert("tasks".to_string(), Value::Array(legacy_array(board)));
    root.insert("notes".to_string(), Value::Array(legacy_array(notes)));
    Value::Object(root)
}

fn legacy_array(text: Option<&str>) -> Vec<Value> {
    text.and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|value| match value {
            Value::Array(items) => Some(items),
            _ => None,
        })
        .unwrap_or_default()
}

fn migrate_tasks(items: &[Value], report: &mut MigrationReport) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(items.len());

    for item in items {
        let Some(record) = item.as_object() else {
            report.dropped_records += 1;
            continue;
        };

        let shape = TaskShape::classify(record);
        if shape.is_legacy() {
            report.legacy_tasks += 1;
        }
        let (status, category) = shape.status_and_category();
        let created = timestamp_field(record, "created").unwrap_or_else(|| id_timestamp(record));
        let priority = record
            .get("priority")
            .and_then(Value::as_str)
            .and_then(Priority::parse)
            .unwrap_or_default();

        tasks.push(Task {
            id: resolve_id(record, &mut seen, report),
            title: string_field(record, "title").unwrap_or_default(),
            category,
            status,
            priority,
            done: status == TaskStatus::Done,
            created,
        });
    }

    tasks
}

fn migrate_notes(items: &[Value], report: &mut MigrationReport) -> Vec<Note> {
    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(items.len());

    for item in items {
        let Some(record) = item.as_object() else {
            report.dropped_records += 1;
            continue;
        };

        let created = timestamp_field(record, "created").unwrap_or_else(|| id_timestamp(record));
        let updated = timestamp_field(record, "updated").unwrap_or(created);
        notes.push(Note {
            id: resolve_id(record, &mut seen, report),
            title: string_field(record, "title").unwrap_or_default(),
            body: string_field(record, "body").unwrap_or_default(),
            created,
            updated: updated.max(created),
        });
    }

    notes
}

fn migrate_stats_history(items: &[Value], report: &mut MigrationReport) -> Vec<StatsSnapshot> {
    let mut history: Vec<StatsSnapshot> = Vec::with_capacity(items.len());

    for item in items {
        let snapshot = item.as_object().and_then(|record| {
            let timestamp = timestamp_field(record, "timestamp")?;
            let done_count = record.get("doneCount").and_then(Value::as_u64)?;
            Some(StatsSnapshot {
                timestamp,
                done_count: usize::try_from(done_count).ok()?,
            })
        });

        match snapshot {
            Some(snapshot)
                if history
                    .last()
                    .is_none_or(|last| last.timestamp <= snapshot.timestamp) =>
            {
                history.push(snapshot)
            }
            _ => report.dropped_records += 1,
        }
    }

    if history.len() > STATS_HISTORY_CAP {
        let excess = history.len() - STATS_HISTORY_CAP;
        history.drain(..excess);
    }
    history
}

fn resolve_id(
    record: &Map<String, Value>,
    seen: &mut HashSet<String>,
    report: &mut MigrationReport,
) -> String {
    let candidate = match record.get("id") {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value.clone()),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    };

    let id = match candidate {
        Some(id) if !seen.contains(&id) => id,
        _ => {
            report.reassigned_ids += 1;
            Uuid::new_v4().to_string()
        }
    };
    seen.insert(id.clone());
    id
}

/// First-release records used `Date.now()` as id, which doubles as the
/// creation timestamp when none was stored.
fn id_timestamp(record: &Map<String, Value>) -> i64 {
    match record.get("id") {
        Some(Value::String(value)) => value.trim().parse::<i64>().unwrap_or(0),
        Some(Value::Number(value)) => value.as_i64().unwrap_or(0),
        _ => 0,
    }
}

fn legacy_done_status(record: &Map<String, Value>) -> TaskStatus {
    if record.get("done").is_some_and(is_truthy) {
        TaskStatus::Done
    } else {
        TaskStatus::Todo
    }
}

/// JavaScript truthiness, matching how the browser widget read `done`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn array_field<'a>(record: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Categories share the label rules of the filter so a stored label always
/// matches the selection made from it.
fn category_field(record: &Map<String, Value>) -> Option<String> {
    normalize_category(record.get("category").and_then(Value::as_str))
}

fn timestamp_field(record: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = record.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|n| n.is_finite()).map(|n| n as i64))
}
