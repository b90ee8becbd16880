//! Core use-case services.
//!
//! # Responsibility
//! - Apply board and note mutations to the store-owned document.
//! - Keep binding layers decoupled from persistence and snapshot rules.

pub mod note_service;
pub mod task_service;
