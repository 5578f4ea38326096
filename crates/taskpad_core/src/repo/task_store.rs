//! Task storage contract shared by both backends.
//!
//! # Responsibility
//! - Define the capability trait implemented by the local blob store and
//!   the table-backed service.
//! - Define the storage error taxonomy.
//!
//! # Invariants
//! - `list` returns tasks newest-first by `created_at`.
//! - `create` rejects empty text; the record it returns has
//!   `completed = false`.

use crate::db::DbError;
use crate::kv::KvError;
use crate::model::task::{Task, TaskId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error taxonomy for task persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Local key-value medium unreachable or corrupt.
    Kv(KvError),
    /// Table backend unreachable or rejected the operation.
    Db(DbError),
    /// Mutation target does not exist in the backend.
    NotFound(TaskId),
    /// Push-channel (change feed) failure.
    Subscription(String),
    /// Persisted or submitted data violates the task shape.
    InvalidData(String),
    /// Connection was not bootstrapped through `db::open_task_db`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Bootstrapped schema is missing a required table.
    MissingRequiredTable(&'static str),
    /// Bootstrapped schema is missing a required column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Subscription(detail) => write!(f, "change subscription failed: {detail}"),
            Self::InvalidData(detail) => write!(f, "invalid persisted task data: {detail}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Capability set over one task collection.
///
/// Two interchangeable implementations exist: the local key-value blob and
/// the table-backed service. `Send` lets the FFI layer own a store handle
/// behind its process-wide context.
pub trait TaskStore: Send {
    /// Returns all tasks, newest-first by creation time.
    fn list(&self) -> StoreResult<Vec<Task>>;

    /// Inserts a new task with `completed = false` and returns the created
    /// record.
    fn create(&self, text: &str) -> StoreResult<Task>;

    /// Sets the completion flag. Absent ids: the local backend no-ops, the
    /// table backend reports `NotFound`.
    fn set_completed(&self, id: &str, completed: bool) -> StoreResult<()>;

    /// Replaces the task text. Same absence contract as `set_completed`.
    fn rename(&self, id: &str, text: &str) -> StoreResult<()>;

    /// Deletes the task. Removing an absent id is a successful no-op.
    fn remove(&self, id: &str) -> StoreResult<()>;

    /// Releases push-channel resources. Default: nothing to release.
    fn shutdown(&self) {}
}

/// Rejects empty or whitespace-only task text.
pub(crate) fn require_text(text: &str) -> StoreResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidData(
            "task text must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{require_text, StoreError};

    #[test]
    fn require_text_trims_and_accepts_real_input() {
        assert_eq!(require_text("  buy milk  ").unwrap(), "buy milk");
    }

    #[test]
    fn require_text_rejects_blank_input() {
        for blank in ["", "   ", "\t\n"] {
            assert!(matches!(
                require_text(blank),
                Err(StoreError::InvalidData(_))
            ));
        }
    }
}
