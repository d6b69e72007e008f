//! # Controller-local event fan-out.
//!
//! Each controller owns one [`Bus`]. Stream hooks publish from whatever thread
//! calls `Stream::write`, the pacer publishes from its task, and the controller
//! publishes on hook changes. Receivers come from [`Controller::subscribe`]
//! and from the subscriber listener spawned at build time.
//!
//! ```text
//! HookLink::write / on_error ─┐
//! Pacer::finish / step       ─┼─► Bus::publish ─► trace record
//! hook() / unhook()          ─┘          └──────► broadcast ring (capacity >= 1)
//!                                                   ├─► Controller::subscribe()
//!                                                   └─► subscriber listener
//! ```
//!
//! Publishing never waits. An event with no live receiver is only traced.
//!
//! [`Controller::subscribe`]: crate::Controller::subscribe

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast sender shared by one controller's hooks and pacer.
#[derive(Clone, Debug)]
pub(crate) struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Ring capacity is clamped to at least one event.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn publish(&self, ev: Event) {
        tracing::trace!(
            seq = ev.seq,
            kind = ?ev.kind,
            stream = ev.stream.as_deref().unwrap_or("-"),
            depth = ?ev.depth,
            "event"
        );
        if self.tx.send(ev).is_err() {
            tracing::trace!("event had no receivers");
        }
    }

    /// Receives only what is published after this call.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub(crate) fn receivers(&self) -> usize {
        self.tx.receiver_count()
    }
}
