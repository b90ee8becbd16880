//! FFI use-case API for the Flutter widget shell.
//!
//! # Responsibility
//! - Own the one process-wide widget store and expose its operations to
//!   Dart via FRB.
//! - Convert core records into flat, string-labelled view structs.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each call locks the store for exactly one event turn.
//! - Unknown ids are reported as successful no-ops, never as failures.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use zenboard_core::{
    categories, category_partition, compute_stats, core_version as core_version_inner,
    init_logging as init_logging_inner, ping as ping_inner, search_notes, sparkline_path,
    sparkline_points, tasks_in_category, DocumentBackend, MemoryBackend, Note, NoteService,
    Priority, SqliteBackend, StateStore, StoreConfig, Task, TaskService, TaskStatus,
};

const WIDGET_DB_FILE_NAME: &str = "zenboard_widget.sqlite3";
const DB_PATH_ENV: &str = "ZENBOARD_DB_PATH";

type WidgetStore = StateStore<Box<dyn DocumentBackend + Send>>;

static WIDGET_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static WIDGET_STORE: OnceLock<Mutex<WidgetStore>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Board card as rendered by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    /// `todo|in-progress|done`.
    pub status: String,
    /// `High|Medium|Low`.
    pub priority: String,
    pub done: bool,
    pub created: i64,
}

/// Board columns under the active category filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub todo: Vec<TaskItem>,
    pub in_progress: Vec<TaskItem>,
    pub done: Vec<TaskItem>,
    pub selected_category: Option<String>,
    /// Every known category, sorted, for the filter chips.
    pub categories: Vec<String>,
}

/// Note list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    /// `title`, or "Untitled" for drafts.
    pub display_title: String,
    pub body: String,
    pub created: i64,
    pub updated: i64,
    pub is_draft: bool,
}

/// Stats panel counters plus sparkline geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub total: u32,
    pub done: u32,
    pub percent: u32,
    pub todo_count: u32,
    pub in_progress_count: u32,
    pub done_count: u32,
    /// SVG `points` attribute; empty when there is no history.
    pub sparkline: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the input was accepted.
    pub ok: bool,
    /// Affected record id, when one exists.
    pub id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_task(outcome: Option<Task>, message: &str) -> Self {
        match outcome {
            Some(task) => Self::success(message, task.id),
            None => Self::unchanged("No matching task; nothing changed."),
        }
    }
}

/// Returns board columns under the current category selection.
#[flutter_rust_bridge::frb(sync)]
pub fn board_view() -> BoardView {
    with_store(|store| {
        let state = store.state();
        let partition = category_partition(&state.tasks, state.selected_category.as_deref());
        BoardView {
            todo: partition.todo.into_iter().map(to_task_item).collect(),
            in_progress: partition.in_progress.into_iter().map(to_task_item).collect(),
            done: partition.done.into_iter().map(to_task_item).collect(),
            selected_category: state.selected_category.clone(),
            categories: categories(&state.tasks)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    })
}

/// Adds a board task.
///
/// `priority` accepts `High|Medium|Low`; `None` means Medium.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(
    title: String,
    category: Option<String>,
    priority: Option<String>,
) -> ActionResponse {
    let priority = match priority.as_deref().map(str::trim) {
        None | Some("") => Priority::default(),
        Some(label) => match Priority::parse(label) {
            Some(priority) => priority,
            None => return ActionResponse::failure(format!("unknown priority `{label}`")),
        },
    };

    with_store(|store| {
        match TaskService::new(store).add_task(&title, category.as_deref(), priority) {
            Ok(task) => ActionResponse::success("Task added.", task.id),
            Err(err) => ActionResponse::failure(format!("board_add_task rejected: {err}")),
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_title(id: String, title: String) -> ActionResponse {
    with_store(|store| match TaskService::new(store).update_title(&id, &title) {
        Ok(outcome) => ActionResponse::from_task(outcome, "Task renamed."),
        Err(err) => ActionResponse::failure(format!("board_update_title rejected: {err}")),
    })
}

/// Moves a task to `status` (`todo|in-progress|done`), e.g. after a drop.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_status(id: String, status: String) -> ActionResponse {
    let Some(status) = TaskStatus::parse(status.trim()) else {
        return ActionResponse::failure(format!("unknown status `{status}`"));
    };
    with_store(|store| {
        ActionResponse::from_task(TaskService::new(store).set_status(&id, status), "Task moved.")
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_toggle_done(id: String, done: bool) -> ActionResponse {
    with_store(|store| {
        ActionResponse::from_task(TaskService::new(store).toggle_done(&id, done), "Task updated.")
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_cycle_priority(id: String) -> ActionResponse {
    with_store(|store| {
        ActionResponse::from_task(
            TaskService::new(store).cycle_priority(&id),
            "Priority changed.",
        )
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(id: String) -> ActionResponse {
    with_store(|store| {
        ActionResponse::from_task(TaskService::new(store).delete_task(&id), "Task deleted.")
    })
}

/// Toggles the category filter and returns the resulting selection.
#[flutter_rust_bridge::frb(sync)]
pub fn board_select_category(category: Option<String>) -> Option<String> {
    with_store(|store| {
        store
            .select_category(category.as_deref())
            .map(str::to_string)
    })
}

/// Category drill-down list across all statuses.
#[flutter_rust_bridge::frb(sync)]
pub fn board_tasks_in_category(category: String) -> Vec<TaskItem> {
    with_store(|store| {
        tasks_in_category(&store.state().tasks, &category)
            .into_iter()
            .map(to_task_item)
            .collect()
    })
}

/// Lists notes, optionally filtered by a search query.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(query: Option<String>) -> Vec<NoteItem> {
    with_store(|store| {
        search_notes(&store.state().notes, query.as_deref().unwrap_or_default())
            .into_iter()
            .map(to_note_item)
            .collect()
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_create() -> ActionResponse {
    with_store(|store| {
        let note = NoteService::new(store).create_note();
        ActionResponse::success("Note created.", note.id)
    })
}

/// Saves the editor contents; safe to call from a debounced autosave.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_save(id: String, title: String, body: String) -> ActionResponse {
    with_store(|store| match NoteService::new(store).save_note(&id, &title, &body) {
        Ok(Some(note)) => ActionResponse::success("Note saved.", note.id),
        Ok(None) => ActionResponse::unchanged("No matching note; nothing changed."),
        Err(err) => ActionResponse::failure(format!("notes_save rejected: {err}")),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(id: String) -> ActionResponse {
    with_store(|store| match NoteService::new(store).delete_note(&id) {
        Some(note) => ActionResponse::success("Note deleted.", note.id),
        None => ActionResponse::unchanged("No matching note; nothing changed."),
    })
}

/// Stats panel for a sparkline box of `width x height` inset by `padding`.
#[flutter_rust_bridge::frb(sync)]
pub fn stats_view(width: f64, height: f64, padding: f64) -> StatsView {
    with_store(|store| {
        let state = store.state();
        let stats = compute_stats(&state.tasks);
        let points = sparkline_points(&state.stats_history, width, height, padding);
        StatsView {
            total: to_u32(stats.total),
            done: to_u32(stats.done),
            percent: stats.percent,
            todo_count: to_u32(stats.per_status.todo),
            in_progress_count: to_u32(stats.per_status.in_progress),
            done_count: to_u32(stats.per_status.done),
            sparkline: sparkline_path(&points),
        }
    })
}

/// Records a completed-count snapshot; returns whether one was appended.
#[flutter_rust_bridge::frb(sync)]
pub fn stats_record_snapshot(force: bool) -> bool {
    with_store(|store| store.record_snapshot(force))
}

fn with_store<T>(f: impl FnOnce(&mut WidgetStore) -> T) -> T {
    let store = WIDGET_STORE.get_or_init(|| Mutex::new(open_widget_store()));
    let mut guard = store.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

fn open_widget_store() -> WidgetStore {
    let db_path = resolve_widget_db_path();
    let backend: Box<dyn DocumentBackend + Send> = match SqliteBackend::open(&db_path) {
        Ok(backend) => Box::new(backend),
        Err(err) => {
            warn!(
                "event=widget_open module=ffi status=fallback error_code=storage_unavailable error={err}"
            );
            Box::new(MemoryBackend::new())
        }
    };

    let mut store = StateStore::open(backend, StoreConfig::default());
    store.begin_session();
    store
}

fn resolve_widget_db_path() -> PathBuf {
    WIDGET_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(WIDGET_DB_FILE_NAME)
        })
        .clone()
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.clone(),
        title: task.title.clone(),
        category: task.category.clone(),
        status: task.status.as_str().to_string(),
        priority: task.priority.as_str().to_string(),
        done: task.done,
        created: task.created,
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.clone(),
        title: note.title.clone(),
        display_title: note.display_title().to_string(),
        body: note.body.clone(),
        created: note.created,
        updated: note.updated,
        is_draft: note.is_draft(),
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
