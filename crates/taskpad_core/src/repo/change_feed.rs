//! Push-change notifications for the table backend.
//!
//! # Responsibility
//! - Surface insert/update/delete events on the todos table to the
//!   subscriber.
//! - Queue events so delivery never re-enters the mutating connection.
//!
//! # Invariants
//! - Events carry no row payload; any event means "collection changed".
//! - Events are delivered only when the subscriber drains the feed.

use std::sync::mpsc::{Receiver, TryRecvError};

/// Kind of backend mutation that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// One change notification.
///
/// Subscribers never inspect the payload beyond logging; every event
/// triggers the same wholesale re-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub action: ChangeAction,
    /// Backend row id, informational only.
    pub rowid: i64,
}

/// Receiving side of the change subscription.
///
/// Held by the task state store for the lifetime of the context; dropping
/// it silently detaches the publisher.
pub struct ChangeFeed {
    receiver: Receiver<ChangeEvent>,
}

impl ChangeFeed {
    pub(crate) fn new(receiver: Receiver<ChangeEvent>) -> Self {
        Self { receiver }
    }

    /// Drains all queued events without blocking.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}
