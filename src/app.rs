use std::cmp::min;

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;
use tracing::{debug, error, info, warn};

use crate::{
    error::StoreError,
    form::{FormEvent, FormValues, TaskForm},
    model::{NewTask, Task, TaskChanges, TaskId},
    store::SharedStore,
    toast::Toaster,
};

pub const CREATED: &str = "New task created.";
pub const CREATE_FAILED: &str = "Failed to create task.";
pub const UPDATED: &str = "Task updated.";
pub const UPDATE_FAILED: &str = "Failed to update task.";
pub const DELETED: &str = "Task deleted.";
pub const DELETE_FAILED: &str = "Failed to delete task.";
pub const TOGGLE_FAILED: &str = "Failed to update task status.";
pub const LOAD_FAILED: &str = "Failed to load task data.";
pub const LOAD_PROBLEM: &str = "A problem occurred while loading task data.";
pub const LIST_FAILED: &str = "Failed to load tasks.";
pub const UNEXPECTED: &str = "An unexpected error occurred.";

#[derive(Debug)]
pub enum Screen {
    List,
    Create(TaskForm),
    /// Waiting for the row that seeds the edit form.
    LoadingEdit(TaskId),
    Edit { id: TaskId, form: TaskForm },
}

/// Work that talks to the store. Returned by key handling so the caller can
/// draw the busy state before the call blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh,
    ToggleCompleted { id: TaskId, is_completed: bool },
    Delete(TaskId),
    Create(NewTask),
    Update { id: TaskId, changes: TaskChanges },
    LoadEdit(TaskId),
}

/// The authoritative task collection and its load state.
#[derive(Debug, Default)]
pub struct ListView {
    pub tasks: Vec<Task>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub table_state: TableState,
    /// Row awaiting delete confirmation; `Some` while the dialog is open.
    pub pending_delete: Option<TaskId>,
}

impl ListView {
    pub fn selected_task(&self) -> Option<&Task> {
        self.table_state.selected().and_then(|i| self.tasks.get(i))
    }

    pub fn pending_task(&self) -> Option<&Task> {
        let id = self.pending_delete.as_ref()?;
        self.tasks.iter().find(|task| &task.id == id)
    }

    fn move_up(&mut self) {
        match self.table_state.selected() {
            Some(v) => self.table_state.select(Some(v.saturating_sub(1))),
            None if !self.tasks.is_empty() => self.table_state.select(Some(0)),
            None => {}
        }
    }

    fn move_down(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        match self.table_state.selected() {
            Some(v) => self
                .table_state
                .select(Some(min(v + 1, self.tasks.len() - 1))),
            None => self.table_state.select(Some(0)),
        }
    }

    fn clamp_selection(&mut self) {
        let selected = match (self.table_state.selected(), self.tasks.len()) {
            (_, 0) => None,
            (Some(v), len) => Some(min(v, len - 1)),
            (None, _) => Some(0),
        };
        self.table_state.select(selected);
    }
}

pub struct App {
    store: SharedStore,
    pub screen: Screen,
    pub list: ListView,
    pub toaster: Toaster,
    /// A mutation is in flight; inputs render disabled.
    pub submitting: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            screen: Screen::List,
            list: ListView {
                is_loading: true,
                ..ListView::default()
            },
            toaster: Toaster::default(),
            submitting: false,
            should_quit: false,
        }
    }

    /// Runs a command and everything it leads to without drawing in between.
    pub fn dispatch(&mut self, command: Command) {
        let mut next = Some(command);
        while let Some(command) = next {
            self.begin(&command);
            next = self.perform(command);
        }
    }

    /// Marks the state a command is about to make busy.
    pub fn begin(&mut self, command: &Command) {
        match command {
            Command::Refresh => {
                self.list.is_loading = true;
                self.list.error = None;
            }
            Command::LoadEdit(_) => {}
            _ => self.submitting = true,
        }
    }

    /// Executes a command against the store. The returned command is the
    /// follow-up fetch of a screen that was navigated to.
    pub fn perform(&mut self, command: Command) -> Option<Command> {
        let follow_up = match command {
            Command::Refresh => {
                self.refresh();
                None
            }
            Command::ToggleCompleted { id, is_completed } => {
                self.toggle_completed(&id, is_completed);
                None
            }
            Command::Delete(id) => {
                self.delete(&id);
                None
            }
            Command::Create(task) => self.create(&task),
            Command::Update { id, changes } => self.update(&id, &changes),
            Command::LoadEdit(id) => self.load_edit(id),
        };
        self.submitting = false;
        follow_up
    }

    fn refresh(&mut self) {
        self.list.is_loading = true;
        self.list.error = None;
        match self.store.list_tasks() {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task list refreshed");
                self.list.tasks = tasks;
                self.list.clamp_selection();
            }
            Err(err) => {
                if err.is_unexpected() {
                    error!(error = %err, "unexpected failure fetching tasks");
                } else {
                    warn!(error = %err, "failed fetching tasks");
                }
                // rows from the last good fetch stay as they are
                self.list.error = Some(format!("{LIST_FAILED} ({err})"));
            }
        }
        self.list.is_loading = false;
    }

    fn toggle_completed(&mut self, id: &TaskId, is_completed: bool) {
        match self.store.set_completed(id, is_completed) {
            Ok(()) => {
                info!(%id, is_completed, "task status updated");
                self.refresh();
            }
            Err(err) => self.report_failure(TOGGLE_FAILED, &err),
        }
    }

    fn delete(&mut self, id: &TaskId) {
        match self.store.delete_task(id) {
            Ok(()) => {
                info!(%id, "task deleted");
                self.refresh();
                self.toaster.success(DELETED);
            }
            Err(err) => self.report_failure(DELETE_FAILED, &err),
        }
        self.list.pending_delete = None;
    }

    fn create(&mut self, task: &NewTask) -> Option<Command> {
        match self.store.insert_task(task) {
            Ok(()) => {
                info!(task = %task.task, "task created");
                self.toaster.success(CREATED);
                Some(self.show_list())
            }
            Err(err) => {
                self.report_failure(CREATE_FAILED, &err);
                None
            }
        }
    }

    fn update(&mut self, id: &TaskId, changes: &TaskChanges) -> Option<Command> {
        match self.store.update_task(id, changes) {
            Ok(()) => {
                info!(%id, "task updated");
                self.toaster.success(UPDATED);
                Some(self.show_list())
            }
            Err(err) => {
                self.report_failure(UPDATE_FAILED, &err);
                None
            }
        }
    }

    fn load_edit(&mut self, id: TaskId) -> Option<Command> {
        match self.store.fetch_task(&id) {
            Ok(task) => {
                debug!(%id, "editing task");
                let form = TaskForm::edit(FormValues::from(&task));
                self.screen = Screen::Edit { id, form };
                None
            }
            Err(err) => {
                if err.is_unexpected() {
                    error!(%id, error = %err, "unexpected failure loading task for edit");
                    self.toaster.error(LOAD_PROBLEM);
                } else {
                    warn!(%id, error = %err, "failed loading task for edit");
                    self.toaster.error(LOAD_FAILED);
                }
                Some(self.show_list())
            }
        }
    }

    fn report_failure(&mut self, summary: &str, err: &StoreError) {
        if err.is_unexpected() {
            error!(error = %err, "{summary}");
            self.toaster.error(UNEXPECTED);
        } else {
            warn!(error = %err, "{summary}");
            self.toaster.error(format!("{summary} ({err})"));
        }
    }

    fn show_list(&mut self) -> Command {
        debug!("showing task list");
        self.screen = Screen::List;
        Command::Refresh
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        self.handle_key_on(key, Local::now().date_naive())
    }

    /// Key handling with an explicit "today" for the date picker.
    pub fn handle_key_on(&mut self, key: KeyEvent, today: NaiveDate) -> Option<Command> {
        if self.submitting {
            return None;
        }

        if matches!(self.screen, Screen::List) {
            return self.handle_list_key(key);
        }
        let event = match &mut self.screen {
            Screen::Create(form) | Screen::Edit { form, .. } => form.handle_key(key, today),
            Screen::List | Screen::LoadingEdit(_) => return None,
        };

        match event {
            FormEvent::None => None,
            FormEvent::Back => Some(self.show_list()),
            FormEvent::Submit(values) => match &self.screen {
                Screen::Create(_) => Some(Command::Create(TaskForm::new_task(&values))),
                Screen::Edit { id, .. } => Some(Command::Update {
                    id: id.clone(),
                    changes: TaskForm::changes(&values),
                }),
                _ => None,
            },
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Command> {
        if self.list.pending_delete.is_some() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.list.pending_delete.clone().map(Command::Delete)
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.list.pending_delete = None;
                    None
                }
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.list.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.list.move_up(),
            KeyCode::Char('r') => return Some(Command::Refresh),
            KeyCode::Char('n') => {
                debug!("opening create form");
                self.screen = Screen::Create(TaskForm::create());
            }
            KeyCode::Char(' ') => {
                return self
                    .list
                    .selected_task()
                    .map(|task| Command::ToggleCompleted {
                        id: task.id.clone(),
                        is_completed: !task.is_completed,
                    });
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let id = self.list.selected_task()?.id.clone();
                self.screen = Screen::LoadingEdit(id.clone());
                return Some(Command::LoadEdit(id));
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.list.pending_delete = self.list.selected_task().map(|task| task.id.clone());
            }
            _ => {}
        }
        None
    }
}
