//! Core state model for the Zenboard productivity widget.
//! This crate is the single source of truth for board, note and stats
//! invariants; rendering and gesture handling live in binding layers.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod migration;
pub mod model;
pub mod service;
pub mod stats;
pub mod store;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use migration::{assemble_legacy_document, migrate, migrate_document, MigrationReport};
pub use model::note::{Note, UNTITLED_NOTE_TITLE};
pub use model::state::{AppState, StatsSnapshot, STATS_HISTORY_CAP};
pub use model::task::{normalize_category, Priority, RecordId, Task, TaskStatus};
pub use service::note_service::{search_notes, NoteService, NoteServiceError};
pub use service::task_service::{TaskService, TaskServiceError};
pub use stats::{
    compute_stats, sparkline_path, sparkline_points, SparkPoint, StatusCounts, TaskStats,
};
pub use store::backend::{DocumentBackend, MemoryBackend, SqliteBackend, StoreError, StoreResult};
pub use store::StateStore;
pub use view::{categories, category_partition, tasks_in_category, BoardPartition};

/// Minimal health-check API for binding smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
