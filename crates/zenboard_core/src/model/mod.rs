//! Widget domain model for board/notes/stats projections.
//!
//! # Responsibility
//! - Define canonical record shapes persisted in the widget document.
//! - Keep one aggregate (`AppState`) as the single source of truth.
//!
//! # Invariants
//! - Every task and note is identified by a stable string id.
//! - `Task::done` mirrors `Task::status == TaskStatus::Done`.
//!
//! # See also
//! - crate::migration for legacy shape handling.

pub mod note;
pub mod state;
pub mod task;
