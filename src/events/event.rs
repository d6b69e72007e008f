//! # Runtime events emitted by a controller, its hooks and its pacer.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Hook events**: a stream started or stopped routing through the controller
//! - **Write events**: queued, settled, failed
//! - **Queue events**: stream failures (latch) and drain
//!
//! The [`Event`] struct carries the metadata: timestamps, stream name,
//! payload, error, queue depth, and for drains the error history.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events published by the pacer (settled/failed/drained) are in settlement order.
//!
//! ## Example
//! ```rust
//! use decollide::{Event, EventKind, Payload};
//!
//! let ev = Event::new(EventKind::WriteSettled)
//!     .with_stream("stdout")
//!     .with_payload(Payload::from("hello"))
//!     .with_depth(0);
//!
//! assert_eq!(ev.kind, EventKind::WriteSettled);
//! assert_eq!(ev.stream.as_deref(), Some("stdout"));
//! assert_eq!(ev.depth, Some(0));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::ErrorRecord;
use crate::error::WriteError;
use crate::sinks::Payload;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Hook events ===
    /// A stream now routes its writes through the controller.
    ///
    /// Sets:
    /// - `stream`: stream name
    Hooked,

    /// A stream writes straight to its sink again.
    ///
    /// Sets:
    /// - `stream`: stream name
    /// - `error`: the stream failure that caused it, if any
    Unhooked,

    // === Write events ===
    /// A write was accepted into the queue.
    ///
    /// Sets:
    /// - `stream`: stream name
    /// - `payload`: the payload
    /// - `depth`: queue depth after enqueue
    WriteQueued,

    /// A write was acknowledged by its sink.
    ///
    /// Sets:
    /// - `stream`: stream name
    /// - `payload`: the payload
    /// - `depth`: queue depth after settle
    WriteSettled,

    /// A write attempt failed (timeout or latched stream error).
    ///
    /// Sets:
    /// - `stream`: stream name
    /// - `payload`: the payload
    /// - `error`: the failure
    /// - `depth`: queue depth after settle
    WriteFailed,

    // === Queue events ===
    /// A stream reported an out-of-band failure; the error is now latched.
    ///
    /// Sets:
    /// - `stream`: stream name
    /// - `error`: the failure
    /// - `depth`: queue depth at the time of the report
    StreamFailed,

    /// The queue went back to zero pending writes.
    ///
    /// Sets:
    /// - `payload`: the last settled value
    /// - `history`: the complete error history
    /// - `depth`: always 0
    Drained,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the stream, if applicable.
    pub stream: Option<Arc<str>>,
    /// Payload of the write, or the last settled value for drains.
    pub payload: Option<Payload>,
    /// Write or stream failure.
    pub error: Option<WriteError>,
    /// Queue depth observed when the event was produced.
    pub depth: Option<usize>,
    /// Error history snapshot (drains only).
    pub history: Option<Arc<[ErrorRecord]>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            stream: None,
            payload: None,
            error: None,
            depth: None,
            history: None,
        }
    }

    /// Attaches a stream name.
    #[inline]
    pub fn with_stream(mut self, stream: impl Into<Arc<str>>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Attaches a payload.
    #[inline]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attaches an error.
    #[inline]
    pub fn with_error(mut self, error: WriteError) -> Self {
        self.error = Some(error);
        self
    }

    /// Attaches the queue depth.
    #[inline]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Attaches an error history snapshot.
    #[inline]
    pub fn with_history(mut self, history: Arc<[ErrorRecord]>) -> Self {
        self.history = Some(history);
        self
    }

    /// True for `WriteFailed` and `StreamFailed`, the classic `error` event.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, EventKind::WriteFailed | EventKind::StreamFailed)
    }

    #[inline]
    pub fn is_drain(&self) -> bool {
        matches!(self.kind, EventKind::Drained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::Hooked);
        let b = Event::new(EventKind::Hooked);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn error_classification() {
        let err = WriteError::Stream {
            stream: "err".into(),
            reason: "boom".into(),
        };
        assert!(Event::new(EventKind::StreamFailed).with_error(err).is_error());
        assert!(Event::new(EventKind::WriteFailed).is_error());
        assert!(!Event::new(EventKind::WriteSettled).is_error());
        assert!(Event::new(EventKind::Drained).is_drain());
    }
}
