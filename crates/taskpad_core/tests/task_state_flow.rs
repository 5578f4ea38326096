use taskpad_core::db::open_task_db_in_memory;
use taskpad_core::kv::{self, KvStore, SharedKv};
use taskpad_core::{
    KvError, LocalTaskStore, StoreError, StoreResult, TableTaskStore, Task, TaskState, TaskStore,
};
use tempfile::TempDir;

fn open_kv(dir: &TempDir) -> SharedKv {
    kv::shared(KvStore::open(dir.path().join("store.json")).unwrap())
}

fn local_state(kv: &SharedKv) -> TaskState {
    let mut state = TaskState::new(Box::new(LocalTaskStore::new(kv.clone())), None);
    state.load();
    state
}

fn table_state() -> TaskState {
    let store = TableTaskStore::try_new(open_task_db_in_memory().unwrap()).unwrap();
    let feed = store.subscribe();
    let mut state = TaskState::new(Box::new(store), Some(feed));
    state.load();
    state
}

/// Backend whose medium is unreachable for every operation.
struct UnreachableStore;

impl TaskStore for UnreachableStore {
    fn list(&self) -> StoreResult<Vec<Task>> {
        Err(StoreError::Kv(KvError::Poisoned))
    }

    fn create(&self, _text: &str) -> StoreResult<Task> {
        Err(StoreError::Kv(KvError::Poisoned))
    }

    fn set_completed(&self, _id: &str, _completed: bool) -> StoreResult<()> {
        Err(StoreError::Kv(KvError::Poisoned))
    }

    fn rename(&self, _id: &str, _text: &str) -> StoreResult<()> {
        Err(StoreError::Kv(KvError::Poisoned))
    }

    fn remove(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::Kv(KvError::Poisoned))
    }
}

/// Backend that serves reads but rejects every mutation.
struct ReadOnlyStore {
    tasks: Vec<Task>,
}

impl TaskStore for ReadOnlyStore {
    fn list(&self) -> StoreResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn create(&self, _text: &str) -> StoreResult<Task> {
        Err(StoreError::Kv(KvError::Poisoned))
    }

    fn set_completed(&self, _id: &str, _completed: bool) -> StoreResult<()> {
        Err(StoreError::Kv(KvError::Poisoned))
    }

    fn rename(&self, _id: &str, _text: &str) -> StoreResult<()> {
        Err(StoreError::Kv(KvError::Poisoned))
    }

    fn remove(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::Kv(KvError::Poisoned))
    }
}

#[test]
fn loading_flag_clears_after_initial_load() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);

    let mut state = TaskState::new(Box::new(LocalTaskStore::new(kv)), None);
    assert!(state.is_loading());

    state.load();
    assert!(!state.is_loading());
    assert!(state.todos().is_empty());
}

#[test]
fn failed_load_leaves_collection_empty_and_clears_loading() {
    let mut state = TaskState::new(Box::new(UnreachableStore), None);
    state.load();

    assert!(!state.is_loading());
    assert!(state.todos().is_empty());
}

#[test]
fn add_task_scenario_buy_milk() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);
    let mut state = local_state(&kv);

    state.add_task("buy milk");

    assert_eq!(state.todos().len(), 1);
    assert_eq!(state.todos()[0].text, "buy milk");
    assert!(!state.todos()[0].completed);
}

#[test]
fn local_mutations_adopt_state_and_reach_the_medium() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);
    let mut state = local_state(&kv);

    state.add_task("alpha");
    state.add_task("beta");
    assert_eq!(state.todos().len(), 2);
    assert_eq!(state.todos()[0].text, "beta");

    let beta_id = state.todos()[0].id.clone();
    state.toggle_task(&beta_id);
    assert!(state.todos()[0].completed);

    state.rename_task(&beta_id, "beta prime");
    assert_eq!(state.todos()[0].text, "beta prime");

    let alpha_id = state.todos()[1].id.clone();
    state.delete_task(&alpha_id);
    assert_eq!(state.todos().len(), 1);

    // A second handle over the same medium observes every adopted change.
    let verifier = LocalTaskStore::new(kv);
    let persisted = verifier.list().unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].id, beta_id);
    assert_eq!(persisted[0].text, "beta prime");
    assert!(persisted[0].completed);
}

#[test]
fn toggle_twice_restores_original_value() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);
    kv::lock(&kv)
        .unwrap()
        .set(
            "tasks",
            r#"[{"id":"1","text":"a","completed":false,"createdAt":1}]"#,
        )
        .unwrap();

    let mut state = local_state(&kv);
    assert_eq!(state.todos().len(), 1);

    state.toggle_task("1");
    assert!(state.todos()[0].completed);

    state.toggle_task("1");
    assert!(!state.todos()[0].completed);
}

#[test]
fn blank_add_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);
    let mut state = local_state(&kv);

    state.add_task("   ");
    assert!(state.todos().is_empty());
}

#[test]
fn unknown_id_mutations_are_noops() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);
    let mut state = local_state(&kv);

    state.add_task("only one");
    state.toggle_task("no-such-id");
    state.rename_task("no-such-id", "new text");
    state.delete_task("no-such-id");

    assert_eq!(state.todos().len(), 1);
    assert_eq!(state.todos()[0].text, "only one");
    assert!(!state.todos()[0].completed);
}

#[test]
fn failed_mutations_leave_state_unchanged() {
    let seeded = vec![Task::with_id("1".to_string(), "a", 1)];
    let mut state = TaskState::new(
        Box::new(ReadOnlyStore {
            tasks: seeded.clone(),
        }),
        None,
    );
    state.load();

    state.add_task("rejected");
    state.toggle_task("1");
    state.rename_task("1", "rejected");
    state.delete_task("1");

    assert_eq!(state.todos(), seeded.as_slice());
}

#[test]
fn table_backend_converges_through_pump_not_mutators() {
    let mut state = table_state();

    state.add_task("remote milk");
    // No optimistic update: the mutation is only visible after the change
    // feed delivers and triggers the refetch.
    assert!(state.todos().is_empty());

    state.pump();
    assert_eq!(state.todos().len(), 1);
    assert_eq!(state.todos()[0].text, "remote milk");

    let id = state.todos()[0].id.clone();
    state.toggle_task(&id);
    assert!(!state.todos()[0].completed);

    state.pump();
    assert!(state.todos()[0].completed);

    state.delete_task(&id);
    assert_eq!(state.todos().len(), 1);

    state.pump();
    assert!(state.todos().is_empty());
}

#[test]
fn pump_without_feed_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);
    let mut state = local_state(&kv);

    state.add_task("stays");
    state.pump();
    assert_eq!(state.todos().len(), 1);
}

#[test]
fn summary_reflects_collection_counts() {
    let dir = TempDir::new().unwrap();
    let kv = open_kv(&dir);
    let mut state = local_state(&kv);

    state.add_task("one");
    state.add_task("two");
    state.add_task("three");
    let id = state.todos()[0].id.clone();
    state.toggle_task(&id);

    let summary = state.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.pending, 2);
    assert!((summary.progress_pct - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn shutdown_detaches_the_change_feed() {
    let mut state = table_state();

    state.add_task("before shutdown");
    state.pump();
    assert_eq!(state.todos().len(), 1);

    state.shutdown();
    state.add_task("after shutdown");
    state.pump();
    // The feed is gone; only an explicit refresh would show the write.
    assert_eq!(state.todos().len(), 1);
}
