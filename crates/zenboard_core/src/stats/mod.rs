//! Completion statistics and sparkline geometry.
//!
//! # Responsibility
//! - Aggregate task counters for the stats panel.
//! - Map the snapshot log onto sparkline screen coordinates.
//!
//! # Invariants
//! - Pure functions; nothing here mutates the document.
//! - Every status is present in `StatusCounts`, defaulting to zero.

use crate::model::state::StatsSnapshot;
use crate::model::task::{Task, TaskStatus};
use serde::Serialize;

/// Per-status task tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }

    fn bump(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Todo => self.todo += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Done => self.done += 1,
        }
    }
}

/// Aggregate counters rendered by the stats panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub done: usize,
    /// Rounded completion percentage, `0` for an empty board.
    pub percent: u32,
    pub per_status: StatusCounts,
}

/// One sparkline vertex in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SparkPoint {
    pub x: f64,
    pub y: f64,
}

/// Computes board counters.
pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let mut per_status = StatusCounts::default();
    for task in tasks {
        per_status.bump(task.status);
    }

    let total = tasks.len();
    let done = tasks.iter().filter(|task| task.done).count();
    let percent = if total == 0 {
        0
    } else {
        (done as f64 / total as f64 * 100.0).round() as u32
    };

    TaskStats {
        total,
        done,
        percent,
        per_status,
    }
}

/// Maps `done_count` history onto a `width x height` box inset by `padding`.
///
/// Higher counts sit closer to the top. A flat history (all counts equal)
/// is drawn at mid-height. Empty history yields no points.
pub fn sparkline_points(
    history: &[StatsSnapshot],
    width: f64,
    height: f64,
    padding: f64,
) -> Vec<SparkPoint> {
    let Some(first) = history.first() else {
        return Vec::new();
    };

    let (min, max) = history
        .iter()
        .fold((first.done_count, first.done_count), |(lo, hi), entry| {
            (lo.min(entry.done_count), hi.max(entry.done_count))
        });
    let inner_width = width - 2.0 * padding;
    let inner_height = height - 2.0 * padding;
    let step = inner_width / (history.len().saturating_sub(1).max(1)) as f64;
    let range = (max - min) as f64;

    history
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let y = if max == min {
                padding + inner_height / 2.0
            } else {
                let ratio = (entry.done_count - min) as f64 / range;
                padding + (1.0 - ratio) * inner_height
            };
            SparkPoint {
                x: padding + index as f64 * step,
                y,
            }
        })
        .collect()
}

/// Renders points as an SVG `points` attribute (`x,y x,y ...`).
pub fn sparkline_path(points: &[SparkPoint]) -> String {
    points
        .iter()
        .map(|point| format!("{:.1},{:.1}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ")
}
