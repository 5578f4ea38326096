//! Process-local reactive cache of the task collection.
//!
//! # Responsibility
//! - Mirror the backend collection for the UI and expose the mutators.
//! - Converge after backend changes: directly for the local backend,
//!   via the change feed for the table backend.
//!
//! # Invariants
//! - The collection always reflects the last successful backend read;
//!   partial mutation results are never merged in.
//! - Mutators compute the desired state before touching the backend and
//!   adopt it only after the write succeeds.

use crate::model::task::Task;
use crate::repo::change_feed::ChangeFeed;
use crate::repo::task_store::TaskStore;
use log::{debug, error, warn};

/// Dashboard projection of the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Completion percentage in `[0, 100]`; `0` for an empty collection.
    pub progress_pct: f64,
}

/// Bridge between the UI boundary and the configured persistence backend.
///
/// With a change feed attached (table backend), mutators leave the
/// in-memory collection untouched and convergence happens through
/// [`TaskState::pump`]; there is no optimistic update. Without one (local
/// backend), mutators adopt the computed state as soon as the write
/// succeeds.
pub struct TaskState {
    store: Box<dyn TaskStore>,
    feed: Option<ChangeFeed>,
    /// Fixed at construction; stays true after `shutdown` drops the feed
    /// so mutators never fall back to local-style adoption.
    push_backed: bool,
    tasks: Vec<Task>,
    loading: bool,
}

impl TaskState {
    /// Wraps the configured backend. The collection starts empty with the
    /// loading flag set; call [`TaskState::load`] for the initial fetch.
    pub fn new(store: Box<dyn TaskStore>, feed: Option<ChangeFeed>) -> Self {
        let push_backed = feed.is_some();
        Self {
            store,
            feed,
            push_backed,
            tasks: Vec::new(),
            loading: true,
        }
    }

    /// Initial wholesale fetch. A failed load leaves the collection empty;
    /// the loading flag clears either way.
    pub fn load(&mut self) {
        match self.store.list() {
            Ok(tasks) => {
                debug!("event=task_load module=state status=ok count={}", tasks.len());
                self.tasks = tasks;
            }
            Err(err) => error!("event=task_load module=state status=error error={err}"),
        }
        self.loading = false;
    }

    pub fn todos(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replaces the collection from a fresh backend read. A failed refresh
    /// keeps the previous state until the next successful one.
    pub fn refresh(&mut self) {
        match self.store.list() {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => error!("event=task_refresh module=state status=error error={err}"),
        }
    }

    /// Delivers queued change notifications: every pending event triggers
    /// one full refetch. No coalescing; single-user volumes keep this
    /// cheap.
    pub fn pump(&mut self) {
        let events = match &self.feed {
            Some(feed) => feed.drain(),
            None => return,
        };
        for event in events {
            debug!(
                "event=change_notify module=state action={:?} rowid={}",
                event.action, event.rowid
            );
            self.refresh();
        }
    }

    /// Adds a task. Empty or whitespace-only text is a logged no-op.
    pub fn add_task(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            warn!("event=task_add module=state status=noop reason=empty_text");
            return;
        }
        match self.store.create(text) {
            Ok(task) => {
                debug!("event=task_add module=state status=ok id={}", task.id);
                if !self.push_backed {
                    self.tasks.insert(0, task);
                }
            }
            Err(err) => error!("event=task_add module=state status=error error={err}"),
        }
    }

    /// Flips the completion flag of `id`. Unknown ids are a logged no-op:
    /// the desired state cannot be computed without the record.
    pub fn toggle_task(&mut self, id: &str) {
        let Some(current) = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| task.completed)
        else {
            warn!("event=task_toggle module=state status=noop reason=unknown_id id={id}");
            return;
        };

        let next = !current;
        match self.store.set_completed(id, next) {
            Ok(()) => {
                if !self.push_backed {
                    if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
                        task.completed = next;
                    }
                }
            }
            Err(err) => {
                error!("event=task_toggle module=state status=error id={id} error={err}");
            }
        }
    }

    /// Replaces the text of `id`. Unknown ids and blank text are logged
    /// no-ops.
    pub fn rename_task(&mut self, id: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            warn!("event=task_rename module=state status=noop reason=empty_text id={id}");
            return;
        }
        if !self.tasks.iter().any(|task| task.id == id) {
            warn!("event=task_rename module=state status=noop reason=unknown_id id={id}");
            return;
        }

        match self.store.rename(id, text) {
            Ok(()) => {
                if !self.push_backed {
                    if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
                        task.text = text.to_string();
                    }
                }
            }
            Err(err) => {
                error!("event=task_rename module=state status=error id={id} error={err}");
            }
        }
    }

    /// Removes `id`. Deleting an absent id is a successful no-op.
    pub fn delete_task(&mut self, id: &str) {
        match self.store.remove(id) {
            Ok(()) => {
                if !self.push_backed {
                    self.tasks.retain(|task| task.id != id);
                }
            }
            Err(err) => {
                error!("event=task_delete module=state status=error id={id} error={err}");
            }
        }
    }

    /// Computes the dashboard projection from the in-memory collection.
    pub fn summary(&self) -> TaskSummary {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        let pending = total - completed;
        let progress_pct = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        TaskSummary {
            total,
            completed,
            pending,
            progress_pct,
        }
    }

    /// Releases the change subscription on the owning backend.
    pub fn shutdown(&mut self) {
        self.store.shutdown();
        self.feed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::TaskState;
    use crate::model::task::Task;
    use crate::repo::task_store::{StoreResult, TaskStore};

    struct FrozenStore {
        tasks: Vec<Task>,
    }

    impl TaskStore for FrozenStore {
        fn list(&self) -> StoreResult<Vec<Task>> {
            Ok(self.tasks.clone())
        }

        fn create(&self, text: &str) -> StoreResult<Task> {
            Ok(Task::new(text))
        }

        fn set_completed(&self, _id: &str, _completed: bool) -> StoreResult<()> {
            Ok(())
        }

        fn rename(&self, _id: &str, _text: &str) -> StoreResult<()> {
            Ok(())
        }

        fn remove(&self, _id: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn state_with(tasks: Vec<Task>) -> TaskState {
        let mut state = TaskState::new(Box::new(FrozenStore { tasks }), None);
        state.load();
        state
    }

    fn done(id: &str) -> Task {
        let mut task = Task::with_id(id.to_string(), "x", 1);
        task.completed = true;
        task
    }

    #[test]
    fn summary_of_empty_collection_is_all_zero() {
        let state = state_with(Vec::new());
        let summary = state.summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.progress_pct, 0.0);
    }

    #[test]
    fn summary_splits_completed_and_pending() {
        let state = state_with(vec![
            done("1"),
            Task::with_id("2".to_string(), "b", 2),
            Task::with_id("3".to_string(), "c", 3),
            done("4"),
        ]);
        let summary = state.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.progress_pct, 50.0);
    }
}
