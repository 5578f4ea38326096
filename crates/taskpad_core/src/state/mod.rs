//! Process-local state stores consumed by the UI boundary.
//!
//! # Responsibility
//! - Keep the in-memory task collection converged with the configured
//!   backend.
//! - Keep the persisted theme preference and its derived scheme.
//!
//! # Invariants
//! - Adapter failures are logged and swallowed here; the UI layer only
//!   ever observes state, never errors.

pub mod task_state;
pub mod theme_state;
