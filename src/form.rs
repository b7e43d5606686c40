use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    calendar::DatePicker,
    model::{NewTask, Task, TaskChanges, PICKER_DATE_FORMAT},
};

pub const TASK_REQUIRED: &str = "Please enter a task.";
pub const DATE_PLACEHOLDER: &str = "Pick a date";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    Task,
    DueDate,
    Completed,
    Submit,
    Back,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    pub task: String,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
}

impl From<&Task> for FormValues {
    fn from(task: &Task) -> Self {
        Self {
            task: task.task.clone(),
            due_date: task.due_date,
            is_completed: task.is_completed,
        }
    }
}

/// What a key press asks the owning flow to do.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    None,
    Submit(FormValues),
    Back,
}

/// Field state shared by the create and edit flows.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub values: FormValues,
    pub task_error: Option<&'static str>,
    pub show_completed: bool,
    pub focus: Field,
    /// Open date-picker popover.
    pub picker: Option<DatePicker>,
    submit_attempted: bool,
}

impl TaskForm {
    pub fn create() -> Self {
        Self::with_values(FormValues::default(), false)
    }

    pub fn edit(values: FormValues) -> Self {
        Self::with_values(values, true)
    }

    fn with_values(values: FormValues, show_completed: bool) -> Self {
        Self {
            values,
            task_error: None,
            show_completed,
            focus: Field::Task,
            picker: None,
            submit_attempted: false,
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Task, Field::DueDate];
        if self.show_completed {
            fields.push(Field::Completed);
        }
        fields.extend([Field::Submit, Field::Back]);
        fields
    }

    pub fn focus_next(&mut self) {
        self.shift_focus(1);
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.shift_focus(len - 1);
    }

    fn shift_focus(&mut self, by: usize) {
        let fields = self.fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(current + by) % fields.len()];
    }

    /// Runs the task-name rule and records its message.
    pub fn validate(&mut self) -> bool {
        self.task_error = if self.values.task.chars().count() >= 1 {
            None
        } else {
            Some(TASK_REQUIRED)
        };
        self.task_error.is_none()
    }

    // After the first submit attempt errors follow every change.
    fn revalidate(&mut self) {
        if self.submit_attempted {
            self.validate();
        }
    }

    pub fn submit(&mut self) -> FormEvent {
        self.submit_attempted = true;
        if self.validate() {
            FormEvent::Submit(self.values.clone())
        } else {
            self.focus = Field::Task;
            FormEvent::None
        }
    }

    pub fn open_picker(&mut self, today: NaiveDate) {
        self.picker = Some(DatePicker::open(self.values.due_date, today));
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Picking the already selected day clears it, like a single-date calendar.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.values.due_date = if self.values.due_date == Some(date) {
            None
        } else {
            Some(date)
        };
        self.picker = None;
        self.revalidate();
    }

    pub fn clear_date(&mut self) {
        self.values.due_date = None;
        self.revalidate();
    }

    pub fn toggle_completed(&mut self) {
        if self.show_completed {
            self.values.is_completed = !self.values.is_completed;
        }
    }

    pub fn due_label(&self) -> String {
        match self.values.due_date {
            Some(date) => date.format(PICKER_DATE_FORMAT).to_string(),
            None => DATE_PLACEHOLDER.to_string(),
        }
    }

    pub fn new_task(values: &FormValues) -> NewTask {
        NewTask {
            task: values.task.clone(),
            due_date: values.due_date,
            is_completed: false,
        }
    }

    pub fn changes(values: &FormValues) -> TaskChanges {
        TaskChanges {
            task: values.task.clone(),
            due_date: values.due_date,
            is_completed: values.is_completed,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, today: NaiveDate) -> FormEvent {
        if self.picker.is_some() {
            self.handle_picker_key(key);
            return FormEvent::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') => self.submit(),
                _ => FormEvent::None,
            };
        }

        match key.code {
            KeyCode::Esc => return FormEvent::Back,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                return FormEvent::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                return FormEvent::None;
            }
            _ => {}
        }

        match self.focus {
            Field::Task => match key.code {
                KeyCode::Char(c) => {
                    self.values.task.push(c);
                    self.revalidate();
                }
                KeyCode::Backspace => {
                    self.values.task.pop();
                    self.revalidate();
                }
                KeyCode::Enter => return self.submit(),
                _ => {}
            },
            Field::DueDate => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.open_picker(today),
                KeyCode::Delete | KeyCode::Backspace => self.clear_date(),
                _ => {}
            },
            Field::Completed => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.toggle_completed(),
                _ => {}
            },
            Field::Submit => {
                if key.code == KeyCode::Enter {
                    return self.submit();
                }
            }
            Field::Back => {
                if key.code == KeyCode::Enter {
                    return FormEvent::Back;
                }
            }
        }
        FormEvent::None
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => picker.move_days(-1),
            KeyCode::Right | KeyCode::Char('l') => picker.move_days(1),
            KeyCode::Up | KeyCode::Char('k') => picker.move_days(-7),
            KeyCode::Down | KeyCode::Char('j') => picker.move_days(7),
            KeyCode::PageUp | KeyCode::Char('<') => picker.move_months(-1),
            KeyCode::PageDown | KeyCode::Char('>') => picker.move_months(1),
            KeyCode::Char('t') => picker.jump_to_today(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let date = picker.cursor;
                self.select_date(date);
            }
            KeyCode::Esc => self.close_picker(),
            _ => {}
        }
    }
}
