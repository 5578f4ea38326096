//! Table-backed task service and its change-feed wiring.
//!
//! # Responsibility
//! - Execute discrete CRUD calls against the `todos` table.
//! - Publish insert/update/delete events to the active subscriber.
//!
//! # Invariants
//! - Identity and `created_at` are assigned by the backend, never the
//!   caller.
//! - Reads request `created_at DESC` ordering explicitly; the backend does
//!   not guarantee order otherwise.
//! - At most one subscription is active; a new one replaces the previous.

use crate::db::migrations::latest_version;
use crate::model::task::Task;
use crate::repo::change_feed::{ChangeAction, ChangeEvent, ChangeFeed};
use crate::repo::task_store::{require_text, StoreError, StoreResult, TaskStore};
use log::debug;
use rusqlite::hooks::Action;
use rusqlite::{params, Connection, Row};
use std::sync::mpsc;

/// Table serving the task collection.
pub const TODOS_TABLE: &str = "todos";

const TODO_SELECT_SQL: &str = "SELECT id, name, isCompleted, created_at FROM todos";

const REQUIRED_COLUMNS: &[&str] = &["id", "name", "isCompleted", "created_at"];

/// Task service over the migrated `todos` table.
pub struct TableTaskStore {
    conn: Connection,
}

impl TableTaskStore {
    /// Wraps a bootstrapped connection, rejecting unmigrated schemas.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        verify_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens the push-change subscription scoped to the todos table.
    ///
    /// Replaces any previous subscription. Events are queued and must be
    /// drained by the subscriber; they are never delivered re-entrantly
    /// from inside the mutating call.
    pub fn subscribe(&self) -> ChangeFeed {
        let (sender, receiver) = mpsc::channel();
        self.conn.update_hook(Some(
            move |action: Action, _db: &str, table: &str, rowid: i64| {
                if table != TODOS_TABLE {
                    return;
                }
                let action = match action {
                    Action::SQLITE_INSERT => ChangeAction::Insert,
                    Action::SQLITE_DELETE => ChangeAction::Delete,
                    _ => ChangeAction::Update,
                };
                // A dropped subscriber is not an error; the event is moot.
                let _ = sender.send(ChangeEvent { action, rowid });
            },
        ));
        ChangeFeed::new(receiver)
    }
}

impl TaskStore for TableTaskStore {
    fn list(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_todo_row(row)?);
        }
        Ok(tasks)
    }

    fn create(&self, text: &str) -> StoreResult<Task> {
        let text = require_text(text)?;
        self.conn.execute(
            "INSERT INTO todos (name, isCompleted, created_at)
             VALUES (?1, 0, (strftime('%s', 'now') * 1000));",
            params![text],
        )?;
        let rowid = self.conn.last_insert_rowid();

        let mut stmt = self.conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![rowid])?;
        match rows.next()? {
            Some(row) => parse_todo_row(row),
            None => Err(StoreError::InvalidData(format!(
                "created row {rowid} missing on read-back"
            ))),
        }
    }

    fn set_completed(&self, id: &str, completed: bool) -> StoreResult<()> {
        let rowid = parse_backend_id(id)?;
        let changed = self.conn.execute(
            "UPDATE todos SET isCompleted = ?1 WHERE id = ?2;",
            params![completed, rowid],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn rename(&self, id: &str, text: &str) -> StoreResult<()> {
        let text = require_text(text)?;
        let rowid = parse_backend_id(id)?;
        let changed = self.conn.execute(
            "UPDATE todos SET name = ?1 WHERE id = ?2;",
            params![text, rowid],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> StoreResult<()> {
        // A non-numeric id cannot exist in the table; deleting it is the
        // same successful no-op as deleting an absent row.
        let rowid = match id.trim().parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                debug!("event=task_remove module=repo status=noop backend=table id={id}");
                return Ok(());
            }
        };
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1;", params![rowid])?;
        if changed == 0 {
            debug!("event=task_remove module=repo status=noop backend=table id={id}");
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.conn
            .update_hook(None::<fn(Action, &str, &str, i64)>);
    }
}

fn parse_backend_id(id: &str) -> StoreResult<i64> {
    // Backend ids are numeric; anything else cannot name an existing row.
    id.trim()
        .parse::<i64>()
        .map_err(|_| StoreError::NotFound(id.to_string()))
}

fn parse_todo_row(row: &Row<'_>) -> StoreResult<Task> {
    let rowid: i64 = row.get("id")?;

    let completed = match row.get::<_, i64>("isCompleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid isCompleted value `{other}` in todos row {rowid}"
            )));
        }
    };

    Ok(Task {
        id: rowid.to_string(),
        text: row.get("name")?,
        completed,
        created_at: row.get("created_at")?,
    })
}

fn verify_schema(conn: &Connection) -> StoreResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        params![TODOS_TABLE],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Err(StoreError::MissingRequiredTable(TODOS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query(params![TODOS_TABLE])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>(0)?);
    }
    for &column in REQUIRED_COLUMNS {
        if !present.iter().any(|name| name.as_str() == column) {
            return Err(StoreError::MissingRequiredColumn {
                table: TODOS_TABLE,
                column,
            });
        }
    }

    Ok(())
}
