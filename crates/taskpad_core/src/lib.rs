//! Core domain logic for taskpad.
//! This crate is the single source of truth for task and theme state.

pub mod context;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod state;

pub use context::{AppConfig, AppContext, BackendKind, ConfigError};
pub use kv::{KvError, KvStore, SharedKv};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId};
pub use model::theme::{ColorScheme, ThemeMode};
pub use repo::change_feed::{ChangeAction, ChangeEvent, ChangeFeed};
pub use repo::local_store::LocalTaskStore;
pub use repo::table_store::TableTaskStore;
pub use repo::task_store::{StoreError, StoreResult, TaskStore};
pub use state::task_state::{TaskState, TaskSummary};
pub use state::theme_state::ThemeState;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
