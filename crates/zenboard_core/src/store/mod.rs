//! Widget state store.
//!
//! # Responsibility
//! - Own the single live `AppState` for a session.
//! - Load the persisted document through migration and write it back.
//! - Maintain the bounded stats snapshot log and the category selection.
//!
//! # Invariants
//! - Persistence is best-effort: write failures are logged, never surfaced,
//!   and the in-memory state stays authoritative.
//! - Loading never fails; malformed documents degrade to an empty state.
//! - A document that could not be read is never overwritten: the session
//!   keeps working in memory but skips persistence.
//! - Snapshot timestamps never decrease, even if the clock steps backwards.
//!
//! # See also
//! - crate::migration for the upgrade rules applied on load.

pub mod backend;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::migration::{assemble_legacy_document, migrate, migrate_document};
use crate::model::state::{AppState, StatsSnapshot, STATS_HISTORY_CAP};
use crate::model::task::normalize_category;
use backend::DocumentBackend;
use log::{debug, info, warn};
use serde_json::Value;

/// Owner of the live widget document.
pub struct StateStore<B: DocumentBackend, C: Clock = SystemClock> {
    backend: B,
    config: StoreConfig,
    clock: C,
    state: AppState,
    /// `false` when the stored document could not be read on open.
    writable: bool,
}

/// Result of reading the persisted document on open.
struct LoadOutcome {
    state: AppState,
    needs_write: bool,
    writable: bool,
}

impl<B: DocumentBackend> StateStore<B> {
    /// Loads the document from `backend` using the system clock.
    pub fn open(backend: B, config: StoreConfig) -> Self {
        Self::open_with_clock(backend, config, SystemClock)
    }
}

impl<B: DocumentBackend, C: Clock> StateStore<B, C> {
    /// Loads the document from `backend`, migrating it into the current shape.
    ///
    /// # Side effects
    /// - Writes the upgraded document back when migration changed it or when
    ///   it was assembled from first-release legacy keys.
    pub fn open_with_clock(backend: B, config: StoreConfig, clock: C) -> Self {
        let LoadOutcome {
            state,
            needs_write,
            writable,
        } = load_state(&backend, &config);
        info!(
            "event=state_load module=store status=ok tasks={} notes={} snapshots={} upgraded={} writable={}",
            state.tasks.len(),
            state.notes.len(),
            state.stats_history.len(),
            needs_write,
            writable
        );

        let mut store = Self {
            backend,
            config,
            clock,
            state,
            writable,
        };
        if needs_write {
            store.persist();
        }
        store
    }

    /// Read-only view of the live document.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Whether `persist` may write. `false` after an unreadable document.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Serializes the live document and writes it under the document key.
    ///
    /// Failures are logged and swallowed. Skipped entirely when the stored
    /// document could not be read on open.
    pub fn persist(&mut self) {
        if !self.writable {
            debug!("event=state_persist module=store status=skip reason=unread_document");
            return;
        }

        let text = match serde_json::to_string(&self.state) {
            Ok(text) => text,
            Err(err) => {
                warn!("event=state_persist module=store status=error error_code=serialize_failed error={err}");
                return;
            }
        };

        match self.backend.write(&self.config.document_key, &text) {
            Ok(()) => debug!(
                "event=state_persist module=store status=ok bytes={}",
                text.len()
            ),
            Err(err) => warn!(
                "event=state_persist module=store status=error error_code=write_failed error={err}"
            ),
        }
    }

    /// Guarantees at least one snapshot exists for the new session.
    pub fn begin_session(&mut self) -> bool {
        self.record_snapshot(true)
    }

    /// Appends a completed-count snapshot when forced or when the count
    /// changed since the last entry. Persists only if an entry was appended.
    pub fn record_snapshot(&mut self, force: bool) -> bool {
        let appended = self.append_snapshot(force);
        if appended {
            self.persist();
        }
        appended
    }

    /// Toggles the category filter.
    ///
    /// Selecting the active category (or `None`) clears the filter. Returns
    /// the resulting selection.
    pub fn select_category(&mut self, category: Option<&str>) -> Option<&str> {
        let requested = normalize_category(category);
        self.state.selected_category = match requested {
            Some(label) if self.state.selected_category.as_deref() != Some(label.as_str()) => {
                Some(label)
            }
            _ => None,
        };
        self.persist();
        self.state.selected_category.as_deref()
    }

    pub(crate) fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Snapshot append without persistence, for operations that persist once.
    pub(crate) fn append_snapshot(&mut self, force: bool) -> bool {
        let done_count = self.state.done_count();
        let last = self.state.stats_history.last().copied();
        if !force && last.is_some_and(|entry| entry.done_count == done_count) {
            return false;
        }

        let now = self.clock.now_ms();
        let timestamp = last.map_or(now, |entry| now.max(entry.timestamp));
        let history = &mut self.state.stats_history;
        history.push(StatsSnapshot {
            timestamp,
            done_count,
        });
        if history.len() > STATS_HISTORY_CAP {
            let excess = history.len() - STATS_HISTORY_CAP;
            history.drain(..excess);
        }

        debug!(
            "event=stats_snapshot module=store status=ok forced={force} done_count={done_count} history_len={}",
            history.len()
        );
        true
    }
}

fn load_state<B: DocumentBackend>(backend: &B, config: &StoreConfig) -> LoadOutcome {
    // One retry covers transient failures such as a busy database.
    let read = backend.read(&config.document_key).or_else(|err| {
        warn!("event=state_load module=store status=retry error_code=read_failed error={err}");
        backend.read(&config.document_key)
    });

    let (state, needs_write) = match read {
        Ok(Some(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                let state = migrate(&value);
                let changed = serde_json::to_value(&state).map_or(true, |current| current != value);
                (state, changed)
            }
            Err(_) => (migrate_document(&text), true),
        },
        Ok(None) => load_legacy_state(backend, config),
        Err(err) => {
            warn!(
                "event=state_load module=store status=fallback error_code=read_failed persistence=disabled error={err}"
            );
            return LoadOutcome {
                state: AppState::default(),
                needs_write: false,
                writable: false,
            };
        }
    };

    LoadOutcome {
        state,
        needs_write,
        writable: true,
    }
}

fn load_legacy_state<B: DocumentBackend>(backend: &B, config: &StoreConfig) -> (AppState, bool) {
    let read_legacy = |key: &str| match backend.read(key) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=legacy_import module=store status=error error_code=read_failed error={err}");
            None
        }
    };
    let board = read_legacy(&config.legacy_board_key);
    let notes = read_legacy(&config.legacy_notes_key);
    if board.is_none() && notes.is_none() {
        return (AppState::default(), false);
    }

    let state = migrate(&assemble_legacy_document(
        board.as_deref(),
        notes.as_deref(),
    ));
    info!(
        "event=legacy_import module=store status=ok tasks={} notes={}",
        state.tasks.len(),
        state.notes.len()
    );
    (state, true)
}

#[cfg(test)]
mod tests {
    use super::backend::{DocumentBackend, MemoryBackend, StoreError, StoreResult};
    use super::StateStore;
    use crate::clock::ManualClock;
    use crate::config::StoreConfig;
    use std::cell::Cell;

    const STORED_DOCUMENT: &str = r#"{"tasks":[{"id":"k","title":"keep me","status":"todo"}]}"#;

    struct ReadOnlyBackend {
        inner: MemoryBackend,
    }

    impl DocumentBackend for ReadOnlyBackend {
        fn read(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.read(key)
        }

        fn write(&mut self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }

    /// Fails the first `failing_reads` reads, then serves `inner`.
    struct FlakyReadBackend {
        inner: MemoryBackend,
        failing_reads: Cell<u32>,
    }

    impl FlakyReadBackend {
        fn new(failing_reads: u32) -> Self {
            Self {
                inner: MemoryBackend::with_entries([("zen_widget_v2", STORED_DOCUMENT)]),
                failing_reads: Cell::new(failing_reads),
            }
        }
    }

    impl DocumentBackend for FlakyReadBackend {
        fn read(&self, key: &str) -> StoreResult<Option<String>> {
            let remaining = self.failing_reads.get();
            if remaining > 0 {
                self.failing_reads.set(remaining - 1);
                return Err(StoreError::Unavailable("database is locked".to_string()));
            }
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
            self.inner.write(key, value)
        }
    }

    fn store_at(start_ms: i64) -> StateStore<MemoryBackend, ManualClock> {
        StateStore::open_with_clock(
            MemoryBackend::new(),
            StoreConfig::default(),
            ManualClock::new(start_ms),
        )
    }

    #[test]
    fn empty_backend_loads_empty_state_without_writing() {
        let store = store_at(0);
        assert_eq!(store.state(), &Default::default());
        assert_eq!(store.backend().get("zen_widget_v2"), None);
    }

    #[test]
    fn non_forced_snapshot_skips_unchanged_count() {
        let mut store = store_at(100);
        assert!(store.begin_session());
        assert!(!store.record_snapshot(false));
        assert!(store.record_snapshot(true));
        assert_eq!(store.state().stats_history.len(), 2);
    }

    #[test]
    fn snapshot_timestamps_never_go_backwards() {
        let mut store = store_at(1_000);
        store.record_snapshot(true);
        store.clock().set(500);
        store.record_snapshot(true);
        let history = &store.state().stats_history;
        assert_eq!(history[1].timestamp, 1_000);
    }

    #[test]
    fn write_failures_are_swallowed_and_memory_state_survives() {
        let backend = ReadOnlyBackend {
            inner: MemoryBackend::new(),
        };
        let mut store =
            StateStore::open_with_clock(backend, StoreConfig::default(), ManualClock::new(0));
        assert_eq!(store.select_category(Some("work")), Some("work"));
        assert!(store.begin_session());
        assert_eq!(store.state().stats_history.len(), 1);
        assert_eq!(store.state().selected_category.as_deref(), Some("work"));
    }

    #[test]
    fn selecting_none_clears_the_filter() {
        let mut store = store_at(0);
        store.select_category(Some("home"));
        assert_eq!(store.select_category(None), None);
        assert_eq!(store.select_category(Some("  ")), None);
    }

    #[test]
    fn single_transient_read_failure_is_retried() {
        let store = StateStore::open_with_clock(
            FlakyReadBackend::new(1),
            StoreConfig::default(),
            ManualClock::new(0),
        );
        assert!(store.is_writable());
        assert_eq!(store.state().tasks[0].title, "keep me");
    }

    #[test]
    fn unreadable_document_is_never_overwritten() {
        let mut store = StateStore::open_with_clock(
            FlakyReadBackend::new(2),
            StoreConfig::default(),
            ManualClock::new(0),
        );
        assert!(!store.is_writable());
        assert!(store.state().tasks.is_empty());

        assert!(store.begin_session());
        store.select_category(Some("work"));
        assert_eq!(store.state().stats_history.len(), 1);
        assert_eq!(
            store.backend().inner.get("zen_widget_v2"),
            Some(STORED_DOCUMENT)
        );
    }
}
