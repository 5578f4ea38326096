//! Local key-value task backend.
//!
//! # Responsibility
//! - Persist the whole collection as one JSON array blob under one key.
//! - Own identity and timestamp generation for new tasks.
//!
//! # Invariants
//! - Every mutation reads, rewrites, and atomically replaces the blob;
//!   atomicity is whatever the key-value medium guarantees for a
//!   single-key replacement.
//! - Mutations targeting absent ids are successful no-ops.

use crate::kv::{lock, SharedKv};
use crate::model::task::Task;
use crate::repo::task_store::{require_text, StoreError, StoreResult, TaskStore};
use log::debug;

/// Key holding the serialized task array.
pub const TASKS_KEY: &str = "tasks";

/// Whole-collection blob store over the shared key-value medium.
pub struct LocalTaskStore {
    kv: SharedKv,
}

impl LocalTaskStore {
    pub fn new(kv: SharedKv) -> Self {
        Self { kv }
    }

    fn read_all(&self) -> StoreResult<Vec<Task>> {
        let guard = lock(&self.kv)?;
        match guard.get(TASKS_KEY) {
            Some(raw) => serde_json::from_str(raw).map_err(|err| {
                StoreError::InvalidData(format!("stored task blob does not parse: {err}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(&self, tasks: &[Task]) -> StoreResult<()> {
        let serialized = serde_json::to_string(tasks).map_err(|err| {
            StoreError::InvalidData(format!("task blob serialization failed: {err}"))
        })?;
        let mut guard = lock(&self.kv)?;
        guard.set(TASKS_KEY, serialized)?;
        Ok(())
    }
}

impl TaskStore for LocalTaskStore {
    fn list(&self) -> StoreResult<Vec<Task>> {
        let mut tasks = self.read_all()?;
        // Stable sort keeps prepend order for records sharing a timestamp.
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    fn create(&self, text: &str) -> StoreResult<Task> {
        let text = require_text(text)?;
        let task = Task::new(text);

        let mut tasks = self.read_all()?;
        tasks.insert(0, task.clone());
        self.write_all(&tasks)?;

        Ok(task)
    }

    fn set_completed(&self, id: &str, completed: bool) -> StoreResult<()> {
        let mut tasks = self.read_all()?;
        match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => task.completed = completed,
            None => {
                debug!("event=task_set_completed module=repo status=noop backend=local id={id}");
                return Ok(());
            }
        }
        self.write_all(&tasks)
    }

    fn rename(&self, id: &str, text: &str) -> StoreResult<()> {
        let text = require_text(text)?;
        let mut tasks = self.read_all()?;
        match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => task.text = text.to_string(),
            None => {
                debug!("event=task_rename module=repo status=noop backend=local id={id}");
                return Ok(());
            }
        }
        self.write_all(&tasks)
    }

    fn remove(&self, id: &str) -> StoreResult<()> {
        let mut tasks = self.read_all()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            debug!("event=task_remove module=repo status=noop backend=local id={id}");
            return Ok(());
        }
        self.write_all(&tasks)
    }
}
