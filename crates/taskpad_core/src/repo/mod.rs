//! Persistence adapters for the task collection.
//!
//! # Responsibility
//! - Define the single capability set the state layer programs against.
//! - Isolate key-value and SQL details from state orchestration.
//!
//! # Invariants
//! - Backend selection happens once at startup via configuration, never by
//!   swapping call sites.
//! - Adapters return semantic errors (`NotFound`) in addition to medium
//!   transport errors.

pub mod change_feed;
pub mod local_store;
pub mod table_store;
pub mod task_store;
