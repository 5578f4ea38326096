//! Application context: configuration, startup, teardown.
//!
//! # Responsibility
//! - Select the task backend from configuration at startup.
//! - Own the single task/theme state pair for the process lifetime.
//!
//! # Invariants
//! - Backend selection happens exactly once, in `AppContext::init`.
//! - `shutdown` releases the change subscription before dropping state.
//! - Theme persistence always uses the local key-value store, regardless
//!   of the task backend.

use crate::db::open_task_db;
use crate::kv::{self, KvError, KvStore};
use crate::repo::change_feed::ChangeFeed;
use crate::repo::local_store::LocalTaskStore;
use crate::repo::table_store::TableTaskStore;
use crate::repo::task_store::{StoreResult, TaskStore};
use crate::state::task_state::TaskState;
use crate::state::theme_state::ThemeState;
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const KV_FILE_NAME: &str = "taskpad_store.json";
const DB_FILE_NAME: &str = "taskpad_todos.sqlite3";

/// Which persistence backend serves the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Whole-collection JSON blob in the on-device key-value store.
    Local,
    /// Table-backed service with push change notifications.
    Table,
}

/// Startup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the key-value file and the table database.
    pub data_dir: PathBuf,
    /// Task backend selection.
    pub backend: BackendKind,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>, backend: BackendKind) -> Self {
        Self {
            data_dir: data_dir.into(),
            backend,
        }
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        serde_json::from_str(&raw).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            detail: err.to_string(),
        })
    }
}

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        detail: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "config file `{}` unreadable: {source}", path.display())
            }
            Self::Parse { path, detail } => {
                write!(f, "config file `{}` does not parse: {detail}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

/// The one state pair the UI boundary works against.
///
/// Constructed once at startup and passed by handle; the FFI crate owns
/// the process-wide instance.
pub struct AppContext {
    tasks: TaskState,
    theme: ThemeState,
}

impl AppContext {
    /// Opens the configured storage, builds both state stores, and runs
    /// the initial task load.
    pub fn init(config: &AppConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.data_dir).map_err(|err| KvError::Io {
            path: config.data_dir.clone(),
            source: err,
        })?;

        let kv = kv::shared(KvStore::open(config.data_dir.join(KV_FILE_NAME))?);
        let theme = ThemeState::load(Arc::clone(&kv));

        let (store, feed): (Box<dyn TaskStore>, Option<ChangeFeed>) = match config.backend {
            BackendKind::Local => (Box::new(LocalTaskStore::new(Arc::clone(&kv))), None),
            BackendKind::Table => {
                let conn = open_task_db(config.data_dir.join(DB_FILE_NAME))?;
                let store = TableTaskStore::try_new(conn)?;
                let feed = store.subscribe();
                (Box::new(store), Some(feed))
            }
        };

        let mut tasks = TaskState::new(store, feed);
        tasks.load();

        info!(
            "event=app_context_init module=context status=ok backend={:?} data_dir={}",
            config.backend,
            config.data_dir.display()
        );

        Ok(Self { tasks, theme })
    }

    pub fn tasks(&self) -> &TaskState {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskState {
        &mut self.tasks
    }

    pub fn theme(&self) -> &ThemeState {
        &self.theme
    }

    pub fn theme_mut(&mut self) -> &mut ThemeState {
        &mut self.theme
    }

    /// Releases the change subscription and drops all state.
    pub fn shutdown(mut self) {
        self.tasks.shutdown();
        info!("event=app_context_shutdown module=context status=ok");
    }
}
