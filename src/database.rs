use std::{fs, path::{Path, PathBuf}};

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::{
    error::{StoreError, StoreResult},
    model::{parse_due_date, parse_timestamp, NewTask, Task, TaskChanges, TaskId, DATE_FORMAT},
    store::TaskStore,
};

/// The `todos` table kept in a local SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// `~/.todo/todos.sqlite`, or `None` when no home directory is known.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".todo").join("todos.sqlite"))
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.is_dir() {
                fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path)?;
        init_db(&conn)?;
        info!(path = %path.display(), "opened local task store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn init_db(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY,
            task TEXT NOT NULL,
            due_date TEXT,
            is_completed BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        params![],
    )?;
    Ok(())
}

// Ids handed out by this store are integers; anything else cannot match a row.
fn row_id(id: &TaskId) -> Option<i64> {
    id.as_str().parse().ok()
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::new(row.get::<_, i64>(0)?.to_string()),
        task: row.get(1)?,
        due_date: row
            .get::<_, Option<String>>(2)?
            .and_then(|s| parse_due_date(&s)),
        is_completed: row.get(3)?,
        created_at: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| parse_timestamp(&s)),
    })
}

impl TaskStore for SqliteStore {
    #[tracing::instrument(skip(self))]
    fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, task, due_date, is_completed, created_at FROM todos
            ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![], task_from_row)?;
        let tasks = rows.collect::<rusqlite::Result<Vec<Task>>>()?;
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    fn fetch_task(&self, id: &TaskId) -> StoreResult<Task> {
        let not_found = || StoreError::NotFound(id.clone());
        let row_id = row_id(id).ok_or_else(not_found)?;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, task, due_date, is_completed, created_at FROM todos
            WHERE id = ?1 LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![row_id], task_from_row)?;
        match rows.next() {
            Some(task) => Ok(task?),
            None => Err(not_found()),
        }
    }

    #[tracing::instrument(skip(self))]
    fn insert_task(&self, task: &NewTask) -> StoreResult<()> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO todos (task, due_date, is_completed, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                task.task,
                task.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
                task.is_completed,
                created_at
            ],
        )?;
        Ok(())
    }

    // Like the hosted table, a filter matching no row is not an error.
    #[tracing::instrument(skip(self))]
    fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> StoreResult<()> {
        let Some(row_id) = row_id(id) else {
            return Ok(());
        };
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE todos SET
            task = ?2,
            due_date = ?3,
            is_completed = ?4
            WHERE id = ?1",
            params![
                row_id,
                changes.task,
                changes.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
                changes.is_completed
            ],
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn set_completed(&self, id: &TaskId, is_completed: bool) -> StoreResult<()> {
        let Some(row_id) = row_id(id) else {
            return Ok(());
        };
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE todos SET is_completed = ?2 WHERE id = ?1",
            params![row_id, is_completed],
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn delete_task(&self, id: &TaskId) -> StoreResult<()> {
        let Some(row_id) = row_id(id) else {
            return Ok(());
        };
        let conn = self.conn.lock();
        conn.execute("DELETE FROM todos WHERE id = ?1", params![row_id])?;
        Ok(())
    }
}
