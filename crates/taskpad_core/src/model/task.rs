//! Task domain model.
//!
//! # Responsibility
//! - Define the task record persisted by both storage backends.
//! - Mint identity and timestamps for locally created records.
//!
//! # Invariants
//! - `id` is opaque to callers and never reused within a collection
//!   lifetime.
//! - `created_at` is epoch milliseconds and only drives newest-first
//!   display ordering.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Opaque task identifier.
///
/// The local backend mints UUIDv4 values; the table backend converts its
/// numeric row ids to strings. Callers must not parse or interpret it.
pub type TaskId = String;

/// One user-visible to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable opaque ID, unique across the collection lifetime.
    pub id: TaskId,
    /// User-supplied label; non-empty at creation, mutable afterwards.
    pub text: String,
    /// Completion flag, `false` at creation.
    pub completed: bool,
    /// Creation time in epoch milliseconds. Serialized as `createdAt` to
    /// match the on-device blob shape.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Task {
    /// Creates a task with a freshly minted id and the current timestamp.
    ///
    /// Used by the local backend, which owns identity generation. The table
    /// backend assigns identity server-side instead.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), text, now_epoch_ms())
    }

    /// Creates a task with caller-provided identity and timestamp.
    ///
    /// Used by read paths where identity already exists in the backend.
    ///
    /// # Invariants
    /// - `completed` starts as `false`.
    pub fn with_id(id: TaskId, text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
