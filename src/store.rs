use std::sync::Arc;

use crate::error::StoreResult;
use crate::model::{NewTask, Task, TaskChanges, TaskId};

/// Read/write operations against the `todos` table.
pub trait TaskStore: Send + Sync {
    /// All rows, newest `created_at` first.
    fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    /// A single row; `StoreError::NotFound` when no row has this id.
    fn fetch_task(&self, id: &TaskId) -> StoreResult<Task>;

    fn insert_task(&self, task: &NewTask) -> StoreResult<()>;

    fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> StoreResult<()>;

    fn set_completed(&self, id: &TaskId, is_completed: bool) -> StoreResult<()>;

    fn delete_task(&self, id: &TaskId) -> StoreResult<()>;
}

/// The store handle, built once at startup and shared with every flow.
pub type SharedStore = Arc<dyn TaskStore>;
