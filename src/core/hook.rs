//! # Stream hooks.
//!
//! A [`HookLink`] is what a controller installs into a [`Stream`]'s hook slot.
//! It is both the replacement write path and the stream's error listener.
//!
//! ## Architecture
//! ```text
//! hook(stream)   ──► stream.install(link)   (fails if the slot is taken)
//! unhook(stream) ──► stream.release(owner)  (no-op unless owner holds the slot)
//!
//! link.write(stream, payload)
//!   └─► SharedQueue::enqueue_then(payload, |depth| pacer.schedule(job))
//!       └─► publish WriteQueued (still under the queue lock)
//!
//! link.on_error(stream, reason)
//!   ├─► queue.latch(WriteError::Stream)
//!   ├─► publish StreamFailed
//!   └─► Halt policy ─► release(owner) + publish Unhooked
//! ```
//!
//! ## Rules
//! - Ownership is checked by [`OwnerId`]; a controller never clears another's hook
//! - The acknowledgment mode is read from the sink once, at hook time

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::pacer::{Job, PacerHandle};
use crate::core::queue::SharedQueue;
use crate::error::{HookError, WriteError};
use crate::events::{Bus, Event, EventKind};
use crate::sinks::{Completion, Payload, Stream};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of a controller, used to tell hooks apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct OwnerId(u64);

impl OwnerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Replacement write path and error listener installed into a stream.
pub(crate) struct HookLink {
    owner: OwnerId,
    completion: Completion,
    queue: SharedQueue,
    pacer: PacerHandle,
    bus: Bus,
}

impl HookLink {
    #[inline]
    pub(crate) fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Queues `payload` behind every write already scheduled on this controller.
    pub(crate) fn write(&self, stream: &Stream, payload: Payload) {
        let job = Job {
            stream: stream.clone(),
            payload: payload.clone(),
            completion: self.completion,
        };
        let mut scheduled = false;
        self.queue.enqueue_then(payload.clone(), |depth| {
            if !self.pacer.schedule(job) {
                return false;
            }
            scheduled = true;
            tracing::trace!(stream = %stream.name(), depth, "write queued");
            self.bus.publish(
                Event::new(EventKind::WriteQueued)
                    .with_stream(stream.name_arc())
                    .with_payload(payload.clone())
                    .with_depth(depth),
            );
            true
        });
        if !scheduled {
            tracing::warn!(stream = %stream.name(), "pacer stopped, write dropped");
        }
    }

    /// Latches an out-of-band failure of `stream`.
    pub(crate) fn on_error(&self, stream: &Stream, reason: Arc<str>) {
        let err = WriteError::Stream {
            stream: stream.name_arc(),
            reason,
        };
        let (halts, depth) = {
            let mut state = self.queue.lock();
            (state.latch(err.clone()), state.depth())
        };
        tracing::warn!(stream = %stream.name(), error = %err, halts, "stream error latched");

        self.bus.publish(
            Event::new(EventKind::StreamFailed)
                .with_stream(stream.name_arc())
                .with_error(err.clone())
                .with_depth(depth),
        );
        if halts && stream.release(self.owner) {
            self.bus.publish(
                Event::new(EventKind::Unhooked)
                    .with_stream(stream.name_arc())
                    .with_error(err),
            );
        }
    }
}

/// Installs a hook for `owner` into `stream`.
pub(crate) fn hook(
    stream: &Stream,
    owner: OwnerId,
    queue: &SharedQueue,
    pacer: &PacerHandle,
    bus: &Bus,
) -> Result<(), HookError> {
    let link = Arc::new(HookLink {
        owner,
        completion: stream.sink().completion(),
        queue: queue.clone(),
        pacer: pacer.clone(),
        bus: bus.clone(),
    });
    stream.install(link)?;
    tracing::debug!(stream = %stream.name(), "hooked");
    bus.publish(Event::new(EventKind::Hooked).with_stream(stream.name_arc()));
    Ok(())
}

/// Removes `owner`'s hook from `stream`. Returns `true` if one was removed.
pub(crate) fn unhook(stream: &Stream, owner: OwnerId, bus: &Bus) -> bool {
    let removed = stream.release(owner);
    if removed {
        tracing::debug!(stream = %stream.name(), "unhooked");
        bus.publish(Event::new(EventKind::Unhooked).with_stream(stream.name_arc()));
    }
    removed
}
