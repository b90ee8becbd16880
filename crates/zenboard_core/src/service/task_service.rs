//! Board task use-case service.
//!
//! # Responsibility
//! - Create, edit, move, toggle, re-prioritize and delete board tasks.
//! - Pair each mutation with its stats snapshot and persistence side effect.
//!
//! # Invariants
//! - New tasks are inserted at the front (most-recent-first).
//! - `done` stays coupled to `status` after every operation.
//! - Unknown ids are silent no-ops returning `None`.

use crate::clock::Clock;
use crate::model::task::{normalize_category, Priority, Task, TaskStatus};
use crate::store::backend::DocumentBackend;
use crate::store::StateStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected task input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskServiceError {
    /// Title is empty after trimming.
    EmptyTitle,
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskServiceError {}

/// Task operations over a borrowed store.
pub struct TaskService<'s, B: DocumentBackend, C: Clock> {
    store: &'s mut StateStore<B, C>,
}

impl<'s, B: DocumentBackend, C: Clock> TaskService<'s, B, C> {
    pub fn new(store: &'s mut StateStore<B, C>) -> Self {
        Self { store }
    }

    /// Creates a `todo` task at the front of the board.
    ///
    /// # Contract
    /// - Empty trimmed title returns `EmptyTitle` and leaves state unchanged.
    /// - Category is normalized; blank categories become `None`.
    /// - Records a forced snapshot and persists once.
    pub fn add_task(
        &mut self,
        title: &str,
        category: Option<&str>,
        priority: Priority,
    ) -> Result<Task, TaskServiceError> {
        let title = non_empty_title(title)?;
        let task = Task::new(
            title,
            normalize_category(category),
            priority,
            self.store.now_ms(),
        );
        self.store.state_mut().tasks.insert(0, task.clone());
        self.store.append_snapshot(true);
        self.store.persist();

        info!(
            "event=task_add module=task_service status=ok priority={} has_category={}",
            task.priority.as_str(),
            task.category.is_some()
        );
        Ok(task)
    }

    /// Replaces a task title with its trimmed form.
    ///
    /// Returns `Ok(None)` when the id is unknown.
    pub fn update_title(
        &mut self,
        id: &str,
        title: &str,
    ) -> Result<Option<Task>, TaskServiceError> {
        let title = non_empty_title(title)?;
        Ok(self.mutate(id, |task| task.title = title))
    }

    /// Moves a task to `status`, coupling `done`.
    ///
    /// Records a forced snapshot and persists.
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Option<Task> {
        let index = self.position(id)?;
        let task = &mut self.store.state_mut().tasks[index];
        task.set_status(status);
        let updated = task.clone();
        self.store.append_snapshot(true);
        self.store.persist();

        info!(
            "event=task_move module=task_service status=ok to={}",
            status.as_str()
        );
        Some(updated)
    }

    /// Checkbox toggle: checked moves to `done`, unchecked back to `todo`.
    ///
    /// An `in-progress` task never returns to `in-progress` through here.
    pub fn toggle_done(&mut self, id: &str, done: bool) -> Option<Task> {
        let status = if done {
            TaskStatus::Done
        } else {
            TaskStatus::Todo
        };
        self.set_status(id, status)
    }

    /// Advances priority `High -> Medium -> Low -> High`. No snapshot.
    pub fn cycle_priority(&mut self, id: &str) -> Option<Task> {
        self.mutate(id, |task| task.priority = task.priority.next())
    }

    /// Removes a task and records a snapshot only if the done count changed.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.position(id)?;
        let removed = self.store.state_mut().tasks.remove(index);
        self.store.append_snapshot(false);
        self.store.persist();

        info!(
            "event=task_delete module=task_service status=ok was_done={}",
            removed.done
        );
        Some(removed)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.store.state().tasks.iter().position(|task| task.id == id)
    }

    fn mutate(&mut self, id: &str, apply: impl FnOnce(&mut Task)) -> Option<Task> {
        let index = self.position(id)?;
        let task = &mut self.store.state_mut().tasks[index];
        apply(task);
        let updated = task.clone();
        self.store.persist();
        Some(updated)
    }
}

fn non_empty_title(title: &str) -> Result<String, TaskServiceError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskServiceError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{TaskService, TaskServiceError};
    use crate::clock::ManualClock;
    use crate::config::StoreConfig;
    use crate::model::task::{Priority, TaskStatus};
    use crate::store::backend::MemoryBackend;
    use crate::store::StateStore;

    fn store() -> StateStore<MemoryBackend, ManualClock> {
        StateStore::open_with_clock(
            MemoryBackend::new(),
            StoreConfig::default(),
            ManualClock::new(1_000),
        )
    }

    #[test]
    fn add_task_inserts_at_front_with_todo_defaults() {
        let mut store = store();
        let mut service = TaskService::new(&mut store);
        service.add_task("first", None, Priority::Low).unwrap();
        let second = service
            .add_task("  second  ", Some(" work "), Priority::High)
            .unwrap();

        assert_eq!(second.title, "second");
        assert_eq!(second.category.as_deref(), Some("work"));
        assert_eq!(second.created, 1_000);
        assert_eq!(store.state().tasks[0].id, second.id);
        assert_eq!(store.state().stats_history.len(), 2);
    }

    #[test]
    fn update_title_rejects_blank_and_ignores_unknown_ids() {
        let mut store = store();
        let mut service = TaskService::new(&mut store);
        let task = service.add_task("draft", None, Priority::Medium).unwrap();

        assert_eq!(
            service.update_title(&task.id, "   "),
            Err(TaskServiceError::EmptyTitle)
        );
        assert_eq!(service.update_title("missing", "x"), Ok(None));
        let updated = service.update_title(&task.id, " final ").unwrap().unwrap();
        assert_eq!(updated.title, "final");
    }

    #[test]
    fn toggle_from_in_progress_skips_back_to_todo() {
        let mut store = store();
        let mut service = TaskService::new(&mut store);
        let task = service.add_task("t", None, Priority::Medium).unwrap();
        service.set_status(&task.id, TaskStatus::InProgress).unwrap();

        let checked = service.toggle_done(&task.id, true).unwrap();
        assert_eq!(checked.status, TaskStatus::Done);
        let unchecked = service.toggle_done(&task.id, false).unwrap();
        assert_eq!(unchecked.status, TaskStatus::Todo);
        assert!(!unchecked.done);
    }

    #[test]
    fn cycle_priority_does_not_record_snapshot() {
        let mut store = store();
        let mut service = TaskService::new(&mut store);
        let task = service.add_task("t", None, Priority::High).unwrap();
        assert_eq!(
            service.cycle_priority(&task.id).unwrap().priority,
            Priority::Medium
        );
        assert_eq!(store.state().stats_history.len(), 1);
    }

    #[test]
    fn delete_snapshots_only_when_done_count_changes() {
        let mut store = store();
        let mut service = TaskService::new(&mut store);
        let open = service.add_task("open", None, Priority::Medium).unwrap();
        let closed = service.add_task("closed", None, Priority::Medium).unwrap();
        service.set_status(&closed.id, TaskStatus::Done).unwrap();

        service.delete_task(&open.id).unwrap();
        assert_eq!(store.state().stats_history.len(), 3);

        let mut service = TaskService::new(&mut store);
        service.delete_task(&closed.id).unwrap();
        assert_eq!(service.delete_task(&closed.id), None);
        let history = &store.state().stats_history;
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].done_count, 0);
    }
}
