//! Read-only board projections.
//!
//! # Responsibility
//! - Partition tasks into board columns under the active category filter.
//! - Provide the category drill-down list and the category chip list.
//!
//! # Invariants
//! - Projections borrow tasks and never mutate the document.
//! - Relative task order from the document is preserved.

use crate::model::task::{Task, TaskStatus};
use std::collections::BTreeSet;

/// Tasks grouped by board column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPartition<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> BoardPartition<'a> {
    pub fn column(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<&'a Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
        }
    }

    /// Number of tasks across all columns.
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits tasks into columns, keeping only `selected` category when set.
pub fn category_partition<'a>(tasks: &'a [Task], selected: Option<&str>) -> BoardPartition<'a> {
    let mut partition = BoardPartition::default();
    for task in tasks
        .iter()
        .filter(|task| selected.is_none() || task.category.as_deref() == selected)
    {
        partition.column_mut(task.status).push(task);
    }
    partition
}

/// All tasks, any status, whose category equals `category` exactly.
pub fn tasks_in_category<'a>(tasks: &'a [Task], category: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.category.as_deref() == Some(category))
        .collect()
}

/// Distinct non-null categories, sorted, for the filter chip list.
pub fn categories(tasks: &[Task]) -> Vec<&str> {
    tasks
        .iter()
        .filter_map(|task| task.category.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
