#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;

use todo_remote::{
    app::App,
    database::SqliteStore,
    error::{StoreError, StoreResult},
    model::{NewTask, Task, TaskChanges, TaskId},
    store::TaskStore,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Fetch(TaskId),
    Insert(NewTask),
    Update(TaskId, TaskChanges),
    SetCompleted(TaskId, bool),
    Delete(TaskId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    List,
    Fetch,
    Insert,
    Update,
    SetCompleted,
    Delete,
}

#[derive(Debug, Copy, Clone)]
pub enum Failure {
    /// The store answered with an error message.
    Api(&'static str),
    /// The store answered with something that is not a row set.
    Malformed,
}

/// In-memory SQLite store that records every call and can be told to fail.
pub struct RecordingStore {
    inner: SqliteStore,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<(Op, Failure)>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        })
    }

    /// Inserts a row behind the app's back and returns its id.
    pub fn seed(&self, name: &str, due_date: Option<NaiveDate>) -> TaskId {
        self.inner
            .insert_task(&NewTask {
                task: name.to_string(),
                due_date,
                is_completed: false,
            })
            .unwrap();
        self.inner.list_tasks().unwrap()[0].id.clone()
    }

    pub fn row(&self, id: &TaskId) -> Task {
        self.inner.fetch_task(id).unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.failures.lock().push((op, failure));
    }

    pub fn heal(&self) {
        self.failures.lock().clear();
    }

    fn record(&self, call: Call, op: Op) -> StoreResult<()> {
        self.calls.lock().push(call);
        let failure = self
            .failures
            .lock()
            .iter()
            .find(|(failing, _)| *failing == op)
            .map(|(_, failure)| *failure);
        match failure {
            None => Ok(()),
            Some(Failure::Api(message)) => Err(StoreError::Api {
                status: 503,
                code: None,
                message: message.to_string(),
            }),
            Some(Failure::Malformed) => {
                Err(serde_json::from_str::<Vec<Task>>("<html>").unwrap_err().into())
            }
        }
    }
}

impl TaskStore for RecordingStore {
    fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.record(Call::List, Op::List)?;
        self.inner.list_tasks()
    }

    fn fetch_task(&self, id: &TaskId) -> StoreResult<Task> {
        self.record(Call::Fetch(id.clone()), Op::Fetch)?;
        self.inner.fetch_task(id)
    }

    fn insert_task(&self, task: &NewTask) -> StoreResult<()> {
        self.record(Call::Insert(task.clone()), Op::Insert)?;
        self.inner.insert_task(task)
    }

    fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> StoreResult<()> {
        self.record(Call::Update(id.clone(), changes.clone()), Op::Update)?;
        self.inner.update_task(id, changes)
    }

    fn set_completed(&self, id: &TaskId, is_completed: bool) -> StoreResult<()> {
        self.record(Call::SetCompleted(id.clone(), is_completed), Op::SetCompleted)?;
        self.inner.set_completed(id, is_completed)
    }

    fn delete_task(&self, id: &TaskId) -> StoreResult<()> {
        self.record(Call::Delete(id.clone()), Op::Delete)?;
        self.inner.delete_task(id)
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// App with its first list fetch done and the call log cleared.
pub fn loaded_app(store: &Arc<RecordingStore>) -> App {
    let mut app = App::new(store.clone());
    app.dispatch(todo_remote::app::Command::Refresh);
    store.clear_calls();
    app
}

pub fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if let Some(command) = app.handle_key_on(KeyEvent::new(code, modifiers), today()) {
        app.dispatch(command);
    }
}

pub fn press(app: &mut App, code: KeyCode) {
    press_with(app, code, KeyModifiers::NONE);
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

pub fn save(app: &mut App) {
    press_with(app, KeyCode::Char('s'), KeyModifiers::CONTROL);
}
