//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task/theme state boundary to Dart via FRB.
//! - Hold the single process-wide app context.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Change notifications are pumped before reads and after mutations, so
//!   the table backend converges within one call round trip.

use log::error;
use std::sync::{Mutex, MutexGuard};
use taskpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppConfig, AppContext, BackendKind, ColorScheme, Task, TaskState, ThemeMode,
};

static APP: Mutex<Option<AppContext>> = Mutex::new(None);

const NOT_INITIALIZED: &str = "app context is not initialized";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task item mirrored to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    /// Stable opaque task ID in string form.
    pub id: String,
    /// User-visible label.
    pub text: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation time in epoch milliseconds, newest first in list order.
    pub created_at_ms: i64,
}

/// List envelope for the task screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    /// Tasks newest-first; empty when unavailable.
    pub items: Vec<TodoItem>,
    /// Whether the initial load is still pending.
    pub loading: bool,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Dashboard summary envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoSummaryResponse {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    /// Completion percentage in `[0, 100]`.
    pub progress_pct: f64,
}

/// Builds the process-wide app context.
///
/// Input semantics:
/// - `data_dir`: directory for on-device storage files.
/// - `backend`: `local` (key-value blob) or `table` (SQLite service with
///   push change notifications).
///
/// # FFI contract
/// - Exactly one context per process; repeated init calls fail.
/// - Never panics; reports failure through the envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn app_init(data_dir: String, backend: String) -> ActionResponse {
    let backend = match backend.trim().to_ascii_lowercase().as_str() {
        "local" => BackendKind::Local,
        "table" => BackendKind::Table,
        other => {
            return ActionResponse::failure(format!(
                "unknown backend `{other}`; expected local|table"
            ));
        }
    };
    init_context(AppConfig::new(data_dir, backend))
}

/// Builds the process-wide app context from a JSON config file.
///
/// # FFI contract
/// - Same lifecycle rules as `app_init`.
#[flutter_rust_bridge::frb(sync)]
pub fn app_init_from_config(config_path: String) -> ActionResponse {
    match AppConfig::from_json_file(&config_path) {
        Ok(config) => init_context(config),
        Err(err) => ActionResponse::failure(format!("app_init_from_config failed: {err}")),
    }
}

/// Releases the process-wide app context.
///
/// # FFI contract
/// - Never panics; reports a missing context through the envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn app_shutdown() -> ActionResponse {
    let mut guard = match lock_app() {
        Ok(guard) => guard,
        Err(message) => return ActionResponse::failure(message),
    };
    match guard.take() {
        Some(ctx) => {
            ctx.shutdown();
            ActionResponse::success("App context released.")
        }
        None => ActionResponse::failure(NOT_INITIALIZED),
    }
}

/// Returns the task collection, newest first, plus the loading flag.
///
/// # FFI contract
/// - Pumps pending change notifications before reading.
/// - Never panics; an unavailable context yields an empty list and a
///   diagnostic message.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list() -> TodoListResponse {
    let mut guard = match lock_app() {
        Ok(guard) => guard,
        Err(message) => {
            return TodoListResponse {
                items: Vec::new(),
                loading: false,
                message,
            };
        }
    };
    match guard.as_mut() {
        Some(ctx) => {
            ctx.tasks_mut().pump();
            let items = ctx.tasks().todos().iter().map(to_todo_item).collect();
            TodoListResponse {
                items,
                loading: ctx.tasks().is_loading(),
                message: String::new(),
            }
        }
        None => TodoListResponse {
            items: Vec::new(),
            loading: false,
            message: NOT_INITIALIZED.to_string(),
        },
    }
}

/// Adds a task from the input row.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_add(text: String) -> ActionResponse {
    with_tasks("Task added.", |tasks| tasks.add_task(&text))
}

/// Flips the completion state of one task.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_toggle(id: String) -> ActionResponse {
    with_tasks("Task toggled.", |tasks| tasks.toggle_task(&id))
}

/// Deletes one task.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_delete(id: String) -> ActionResponse {
    with_tasks("Task deleted.", |tasks| tasks.delete_task(&id))
}

/// Replaces the text of one task.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_rename(id: String, text: String) -> ActionResponse {
    with_tasks("Task renamed.", |tasks| tasks.rename_task(&id, &text))
}

/// Returns the dashboard summary for the current collection.
///
/// # FFI contract
/// - Pumps pending change notifications before reading.
/// - An unavailable context yields an all-zero summary.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_summary() -> TodoSummaryResponse {
    let mut guard = match lock_app() {
        Ok(guard) => guard,
        Err(_) => return empty_summary(),
    };
    match guard.as_mut() {
        Some(ctx) => {
            ctx.tasks_mut().pump();
            let summary = ctx.tasks().summary();
            TodoSummaryResponse {
                total: summary.total as u32,
                completed: summary.completed as u32,
                pending: summary.pending as u32,
                progress_pct: summary.progress_pct,
            }
        }
        None => empty_summary(),
    }
}

/// Returns the persisted theme mode string (`light|dark|system`).
///
/// # FFI contract
/// - An unavailable context reports the `system` default.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_mode() -> String {
    match lock_app() {
        Ok(guard) => match guard.as_ref() {
            Some(ctx) => ctx.theme().theme_mode().as_str().to_owned(),
            None => ThemeMode::System.as_str().to_owned(),
        },
        Err(_) => ThemeMode::System.as_str().to_owned(),
    }
}

/// Persists and applies a new theme mode.
#[flutter_rust_bridge::frb(sync)]
pub fn set_theme_mode(mode: String) -> ActionResponse {
    let Some(mode) = ThemeMode::parse(&mode) else {
        return ActionResponse::failure(format!(
            "unknown theme mode `{mode}`; expected light|dark|system"
        ));
    };
    let mut guard = match lock_app() {
        Ok(guard) => guard,
        Err(message) => return ActionResponse::failure(message),
    };
    match guard.as_mut() {
        Some(ctx) => {
            ctx.theme_mut().set_theme_mode(mode);
            ActionResponse::success("Theme updated.")
        }
        None => ActionResponse::failure(NOT_INITIALIZED),
    }
}

/// Returns the effective color scheme string (`light|dark`).
///
/// # FFI contract
/// - An unavailable context reports the `light` fallback.
#[flutter_rust_bridge::frb(sync)]
pub fn color_scheme() -> String {
    match lock_app() {
        Ok(guard) => match guard.as_ref() {
            Some(ctx) => ctx.theme().color_scheme().as_str().to_owned(),
            None => ColorScheme::Light.as_str().to_owned(),
        },
        Err(_) => ColorScheme::Light.as_str().to_owned(),
    }
}

/// Records the platform-reported native scheme.
///
/// Input semantics:
/// - `scheme`: `light` or `dark`; anything else means "unknown" and clears
///   the report.
#[flutter_rust_bridge::frb(sync)]
pub fn set_device_scheme(scheme: String) -> ActionResponse {
    let mut guard = match lock_app() {
        Ok(guard) => guard,
        Err(message) => return ActionResponse::failure(message),
    };
    match guard.as_mut() {
        Some(ctx) => {
            ctx.theme_mut().set_device_scheme(ColorScheme::parse(&scheme));
            ActionResponse::success("Device scheme recorded.")
        }
        None => ActionResponse::failure(NOT_INITIALIZED),
    }
}

fn init_context(config: AppConfig) -> ActionResponse {
    let mut guard = match lock_app() {
        Ok(guard) => guard,
        Err(message) => return ActionResponse::failure(message),
    };
    if guard.is_some() {
        return ActionResponse::failure("app context is already initialized");
    }
    match AppContext::init(&config) {
        Ok(ctx) => {
            *guard = Some(ctx);
            ActionResponse::success("App context ready.")
        }
        Err(err) => {
            error!("event=app_init module=ffi status=error error={err}");
            ActionResponse::failure(format!("app_init failed: {err}"))
        }
    }
}

fn with_tasks(success_message: &str, f: impl FnOnce(&mut TaskState)) -> ActionResponse {
    let mut guard = match lock_app() {
        Ok(guard) => guard,
        Err(message) => return ActionResponse::failure(message),
    };
    match guard.as_mut() {
        Some(ctx) => {
            f(ctx.tasks_mut());
            ctx.tasks_mut().pump();
            ActionResponse::success(success_message)
        }
        None => ActionResponse::failure(NOT_INITIALIZED),
    }
}

fn lock_app() -> Result<MutexGuard<'static, Option<AppContext>>, String> {
    APP.lock()
        .map_err(|_| "app context lock is poisoned".to_string())
}

fn to_todo_item(task: &Task) -> TodoItem {
    TodoItem {
        id: task.id.clone(),
        text: task.text.clone(),
        completed: task.completed,
        created_at_ms: task.created_at,
    }
}

fn empty_summary() -> TodoSummaryResponse {
    TodoSummaryResponse {
        total: 0,
        completed: 0,
        pending: 0,
        progress_pct: 0.0,
    }
}
