mod common;

use common::*;
use crossterm::event::KeyCode;
use todo_remote::{
    app::{App, Command, DELETED, DELETE_FAILED, LIST_FAILED, TOGGLE_FAILED},
    toast::ToastKind,
};

#[test]
fn starts_loading_and_lists_newest_first() {
    let store = RecordingStore::new();
    store.seed("older", None);
    store.seed("newer", None);

    let mut app = App::new(store.clone());
    assert!(app.list.is_loading);
    app.dispatch(Command::Refresh);

    assert!(!app.list.is_loading);
    assert_eq!(app.list.error, None);
    let names: Vec<&str> = app.list.tasks.iter().map(|t| t.task.as_str()).collect();
    assert_eq!(names, ["newer", "older"]);
    assert_eq!(app.list.table_state.selected(), Some(0));
}

#[test]
fn toggling_twice_restores_state_through_refetches() {
    let store = RecordingStore::new();
    let id = store.seed("Walk dog", None);
    let mut app = loaded_app(&store);

    press(&mut app, KeyCode::Char(' '));
    assert_eq!(
        store.calls(),
        vec![Call::SetCompleted(id.clone(), true), Call::List]
    );
    assert!(app.list.tasks[0].is_completed);

    press(&mut app, KeyCode::Char(' '));
    assert_eq!(
        store.calls(),
        vec![
            Call::SetCompleted(id.clone(), true),
            Call::List,
            Call::SetCompleted(id.clone(), false),
            Call::List,
        ]
    );
    assert!(!app.list.tasks[0].is_completed);
    assert!(!store.row(&id).is_completed);
}

#[test]
fn toggle_shows_nothing_until_refetch() {
    let store = RecordingStore::new();
    let id = store.seed("Walk dog", None);
    let mut app = loaded_app(&store);
    store.fail(Op::List, Failure::Api("connection reset"));

    press(&mut app, KeyCode::Char(' '));

    // the write landed, but the failed refetch leaves the old row on screen
    assert!(store.row(&id).is_completed);
    assert!(!app.list.tasks[0].is_completed);
    assert!(app.list.error.is_some());
}

#[test]
fn failed_toggle_is_reported() {
    let store = RecordingStore::new();
    store.seed("Walk dog", None);
    let mut app = loaded_app(&store);
    store.fail(Op::SetCompleted, Failure::Api("permission denied"));

    press(&mut app, KeyCode::Char(' '));

    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.description, format!("{TOGGLE_FAILED} (permission denied)"));
    assert!(!app.list.tasks[0].is_completed);
    assert_eq!(store.calls().len(), 1);
}

#[test]
fn delete_requires_confirmation() {
    let store = RecordingStore::new();
    let keep = store.seed("keep", None);
    let doomed = store.seed("doomed", None);
    let mut app = loaded_app(&store);

    press(&mut app, KeyCode::Char('d'));
    assert_eq!(app.list.pending_delete, Some(doomed.clone()));
    assert!(store.calls().is_empty());

    press(&mut app, KeyCode::Char('y'));
    assert_eq!(store.calls(), vec![Call::Delete(doomed), Call::List]);
    assert_eq!(app.list.pending_delete, None);
    assert_eq!(app.list.tasks.len(), 1);
    assert_eq!(app.list.tasks[0].id, keep);
    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.description, DELETED);
}

#[test]
fn cancel_and_dismiss_make_no_store_calls() {
    let store = RecordingStore::new();
    store.seed("stays", None);
    let mut app = loaded_app(&store);

    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.list.pending_delete, None);

    press(&mut app, KeyCode::Delete);
    assert!(app.list.pending_delete.is_some());
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.list.pending_delete, None);

    assert!(!app.should_quit);
    assert!(store.calls().is_empty());
    assert_eq!(app.list.tasks.len(), 1);
}

#[test]
fn failed_delete_closes_dialog_and_reports() {
    let store = RecordingStore::new();
    let id = store.seed("sticky", None);
    let mut app = loaded_app(&store);
    store.fail(Op::Delete, Failure::Api("foreign key violation"));

    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Enter);

    assert_eq!(store.calls(), vec![Call::Delete(id)]);
    assert_eq!(app.list.pending_delete, None);
    assert_eq!(
        app.toaster.current().unwrap().description,
        format!("{DELETE_FAILED} (foreign key violation)")
    );
    assert_eq!(app.list.tasks.len(), 1);
}

#[test]
fn failed_refresh_keeps_rows() {
    let store = RecordingStore::new();
    store.seed("first", None);
    store.seed("second", None);
    let mut app = loaded_app(&store);
    let before = app.list.tasks.clone();

    store.fail(Op::List, Failure::Api("network unreachable"));
    press(&mut app, KeyCode::Char('r'));

    assert_eq!(
        app.list.error.as_deref(),
        Some(format!("{LIST_FAILED} (network unreachable)").as_str())
    );
    assert_eq!(app.list.tasks, before);
    assert!(!app.list.is_loading);

    store.heal();
    press(&mut app, KeyCode::Char('r'));
    assert_eq!(app.list.error, None);
}

#[test]
fn selection_follows_list() {
    let store = RecordingStore::new();
    for name in ["a", "b", "c"] {
        store.seed(name, None);
    }
    let mut app = loaded_app(&store);

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.list.table_state.selected(), Some(2));
    assert_eq!(app.list.selected_task().unwrap().task, "a");

    // deleting the last row pulls the selection back inside the list
    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Char('y'));
    assert_eq!(app.list.table_state.selected(), Some(1));

    press(&mut app, KeyCode::Up);
    press(&mut app, KeyCode::Char('k'));
    assert_eq!(app.list.table_state.selected(), Some(0));
}

#[test]
fn quit_from_list() {
    let store = RecordingStore::new();
    let mut app = loaded_app(&store);
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
}
