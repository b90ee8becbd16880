use zenboard_core::{
    category_partition, compute_stats, ManualClock, MemoryBackend, NoteService,
    NoteServiceError, Priority, StateStore, StoreConfig, TaskService, TaskServiceError,
    TaskStatus,
};

fn store() -> StateStore<MemoryBackend, ManualClock> {
    StateStore::open_with_clock(
        MemoryBackend::new(),
        StoreConfig::default(),
        ManualClock::new(1_700_000_000_000),
    )
}

#[test]
fn end_to_end_add_then_complete() {
    let mut store = store();
    let mut tasks = TaskService::new(&mut store);
    let task = tasks
        .add_task("Write spec", Some("work"), Priority::High)
        .unwrap();
    assert_eq!(task.status, TaskStatus::Todo);
    assert!(!task.done);
    assert_eq!(task.priority, Priority::High);

    let done = tasks.set_status(&task.id, TaskStatus::Done).unwrap();
    assert!(done.done);

    let stats = compute_stats(&store.state().tasks);
    assert_eq!(stats.total, 1);
    assert_eq!(stats.done, 1);
    assert_eq!(stats.percent, 100);
}

#[test]
fn done_flag_tracks_status_through_any_sequence() {
    let mut store = store();
    let mut tasks = TaskService::new(&mut store);
    let a = tasks.add_task("a", None, Priority::Medium).unwrap();
    let b = tasks.add_task("b", None, Priority::Medium).unwrap();

    tasks.set_status(&a.id, TaskStatus::InProgress);
    tasks.toggle_done(&b.id, true);
    tasks.set_status(&b.id, TaskStatus::InProgress);
    tasks.toggle_done(&a.id, true);
    tasks.toggle_done(&a.id, false);
    tasks.set_status(&b.id, TaskStatus::Done);

    for task in &store.state().tasks {
        assert_eq!(task.done, task.status == TaskStatus::Done);
    }
}

#[test]
fn priority_cycle_closes_after_three_steps() {
    let mut store = store();
    let mut tasks = TaskService::new(&mut store);
    for start in [Priority::High, Priority::Medium, Priority::Low] {
        let task = tasks.add_task("p", None, start).unwrap();
        tasks.cycle_priority(&task.id);
        tasks.cycle_priority(&task.id);
        let back = tasks.cycle_priority(&task.id).unwrap();
        assert_eq!(back.priority, start);
    }
}

#[test]
fn stats_history_is_capped_at_twenty_most_recent() {
    let mut store = store();
    for _ in 0..25 {
        store.clock().advance(1_000);
        assert!(store.record_snapshot(true));
    }
    let history = &store.state().stats_history;
    assert_eq!(history.len(), 20);
    assert_eq!(history[0].timestamp, 1_700_000_006_000);
    assert_eq!(history[19].timestamp, 1_700_000_025_000);
    assert!(history.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[test]
fn selecting_same_category_twice_clears_it() {
    let mut store = store();
    assert_eq!(store.select_category(Some("work")), Some("work"));
    assert_eq!(store.select_category(Some("work")), None);
    assert_eq!(store.state().selected_category, None);

    store.select_category(Some("work"));
    assert_eq!(store.select_category(Some("home")), Some("home"));
}

#[test]
fn selection_drives_board_partition() {
    let mut store = store();
    let mut tasks = TaskService::new(&mut store);
    tasks.add_task("a", Some("work"), Priority::Medium).unwrap();
    tasks.add_task("b", Some("home"), Priority::Medium).unwrap();
    store.select_category(Some("home"));

    let state = store.state();
    let partition = category_partition(&state.tasks, state.selected_category.as_deref());
    assert_eq!(partition.len(), 1);
    assert_eq!(partition.todo[0].title, "b");
}

#[test]
fn empty_titles_are_rejected_without_state_change() {
    let mut store = store();
    let before = store.state().clone();
    let err = TaskService::new(&mut store)
        .add_task("   ", Some("work"), Priority::Medium)
        .unwrap_err();
    assert_eq!(err, TaskServiceError::EmptyTitle);
    assert_eq!(store.state(), &before);

    let note = NoteService::new(&mut store).create_note();
    let before = store.state().clone();
    let err = NoteService::new(&mut store)
        .save_note(&note.id, " \t ", "body")
        .unwrap_err();
    assert_eq!(err, NoteServiceError::EmptyTitle);
    assert_eq!(store.state(), &before);
}

#[test]
fn operations_persist_the_document() {
    let mut store = store();
    let task = TaskService::new(&mut store)
        .add_task("persisted", None, Priority::Low)
        .unwrap();
    NoteService::new(&mut store).create_note();

    let backend = store.into_backend();
    let reopened = StateStore::open(backend, StoreConfig::default());
    assert_eq!(reopened.state().tasks[0].id, task.id);
    assert_eq!(reopened.state().notes.len(), 1);
    assert_eq!(reopened.state().stats_history.len(), 1);
}

#[test]
fn stale_ids_are_silent_no_ops() {
    let mut store = store();
    let mut tasks = TaskService::new(&mut store);
    let task = tasks.add_task("gone", None, Priority::Medium).unwrap();
    tasks.delete_task(&task.id).unwrap();

    assert_eq!(tasks.set_status(&task.id, TaskStatus::Done), None);
    assert_eq!(tasks.cycle_priority(&task.id), None);
    assert_eq!(tasks.update_title(&task.id, "edit"), Ok(None));
    assert!(store.state().tasks.is_empty());
}
