use taskpad_core::db::open_task_db_in_memory;
use taskpad_core::{ChangeAction, TableTaskStore, TaskStore};

fn fresh_store() -> TableTaskStore {
    TableTaskStore::try_new(open_task_db_in_memory().unwrap()).unwrap()
}

#[test]
fn create_emits_one_insert_event() {
    let store = fresh_store();
    let feed = store.subscribe();

    let created = store.create("buy milk").unwrap();

    let events = feed.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, ChangeAction::Insert);
    assert_eq!(events[0].rowid.to_string(), created.id);
}

#[test]
fn update_and_delete_emit_matching_events() {
    let store = fresh_store();
    let created = store.create("toggle me").unwrap();

    let feed = store.subscribe();
    store.set_completed(&created.id, true).unwrap();
    store.rename(&created.id, "renamed").unwrap();
    store.remove(&created.id).unwrap();

    let actions: Vec<_> = feed.drain().into_iter().map(|event| event.action).collect();
    assert_eq!(
        actions,
        vec![
            ChangeAction::Update,
            ChangeAction::Update,
            ChangeAction::Delete
        ]
    );
}

#[test]
fn drain_empties_the_queue() {
    let store = fresh_store();
    let feed = store.subscribe();

    store.create("one").unwrap();
    assert_eq!(feed.drain().len(), 1);
    assert!(feed.drain().is_empty());
}

#[test]
fn burst_of_mutations_yields_one_event_each() {
    let store = fresh_store();
    let feed = store.subscribe();

    for n in 0..5 {
        store.create(&format!("task {n}")).unwrap();
    }

    assert_eq!(feed.drain().len(), 5);
}

#[test]
fn noop_mutations_emit_no_events() {
    let store = fresh_store();
    let feed = store.subscribe();

    store.remove("4242").unwrap();
    store.remove("not-a-rowid").unwrap();

    assert!(feed.drain().is_empty());
}

#[test]
fn resubscribe_replaces_the_previous_channel() {
    let store = fresh_store();
    let stale = store.subscribe();
    let active = store.subscribe();

    store.create("observed once").unwrap();

    assert!(stale.drain().is_empty());
    assert_eq!(active.drain().len(), 1);
}

#[test]
fn shutdown_releases_the_subscription() {
    let store = fresh_store();
    let feed = store.subscribe();

    store.shutdown();
    store.create("unobserved").unwrap();

    assert!(feed.drain().is_empty());
}
