//! # Mirrored queue state.
//!
//! Mirrors the writes the pacer still has to settle, keeps the error history,
//! and holds the error latch.
//!
//! ## Architecture
//! ```text
//! Stream::write ──► HookLink ──► SharedQueue::enqueue_then(payload, schedule)
//!                                       │  (enqueue + send under one lock)
//!                                       ▼
//!                            pending: VecDeque<Payload>
//!                                       │
//! Pacer ── should_abort() ──────────────┤
//!       ── settle(err?) ───► pop oldest ┴─► Settlement { drained? }
//!
//! Stream::report_error ──► latch(err) ──► errors.push(record) + latched = idx
//! Ack::fail ──► Pacer ──► settle_sink_failure(err) ──► settle + latched = idx (Halt)
//! ```
//!
//! ## Rules
//! - `settle` always pops the **oldest** entry, never searches by value
//! - Every settle shrinks `pending` by exactly one
//! - A settle that empties `pending` carries the drain payload
//! - The latch is sticky: once set it stays set for the life of the controller

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::WriteError;
use crate::policies::ErrorPolicy;
use crate::sinks::Payload;

/// One entry of the error history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Queue depth at the time the error was recorded.
    pub position: usize,
    /// The write the error belongs to, if any.
    ///
    /// Latched stream errors start without a value; under
    /// [`ErrorPolicy::Skip`] the first write that observes the latch is
    /// attached here.
    pub value: Option<Payload>,
    /// The error itself.
    pub error: WriteError,
    /// Set once a pacing check has observed this (latched) error.
    pub consumed: bool,
}

/// Drain notification produced by the settle that emptied the queue.
#[derive(Clone, Debug)]
pub(crate) struct Drain {
    pub last: Option<Payload>,
    pub history: Arc<[ErrorRecord]>,
}

/// Result of [`QueueState::settle`].
#[derive(Debug)]
pub(crate) struct Settlement {
    pub depth: usize,
    pub drained: Option<Drain>,
}

/// Pending writes, error history and latch of one controller.
#[derive(Debug)]
pub(crate) struct QueueState {
    pending: VecDeque<Payload>,
    errors: Vec<ErrorRecord>,
    policy: ErrorPolicy,
    latched: Option<usize>,
}

impl QueueState {
    pub(crate) fn new(policy: ErrorPolicy) -> Self {
        Self {
            pending: VecDeque::new(),
            errors: Vec::new(),
            policy,
            latched: None,
        }
    }

    /// Appends a pending entry and returns the new depth.
    pub(crate) fn enqueue(&mut self, payload: Payload) -> usize {
        self.pending.push_back(payload);
        self.pending.len()
    }

    /// Pops the oldest pending entry, recording `error` against it if given.
    pub(crate) fn settle(&mut self, error: Option<WriteError>) -> Settlement {
        let popped = self.pending.pop_front();
        let depth = self.pending.len();

        if let Some(error) = error {
            self.errors.push(ErrorRecord {
                position: depth,
                value: popped.clone(),
                error,
                consumed: false,
            });
        }

        let drained = if depth == 0 && popped.is_some() {
            Some(Drain {
                last: popped,
                history: self.history(),
            })
        } else {
            None
        };
        Settlement { depth, drained }
    }

    /// Settles the oldest entry as failed by its own sink.
    ///
    /// Under `Halt` the recorded error is also latched, so later writes abort.
    /// Returns `true` in that case.
    pub(crate) fn settle_sink_failure(&mut self, error: WriteError) -> (Settlement, bool) {
        let settlement = self.settle(Some(error));
        let halts = !self.policy.skips();
        if halts {
            self.latched = Some(self.errors.len() - 1);
        }
        (settlement, halts)
    }

    /// Latches a stream error. Returns `true` if the policy halts on it.
    pub(crate) fn latch(&mut self, error: WriteError) -> bool {
        self.errors.push(ErrorRecord {
            position: self.pending.len(),
            value: None,
            error,
            consumed: false,
        });
        self.latched = Some(self.errors.len() - 1);
        !self.policy.skips()
    }

    /// Pacing check for the write carrying `current`.
    ///
    /// Returns the latched error if the write must abort (`Halt`). Under
    /// `Skip` always returns `None`; the first check after a latch attaches
    /// `current` to the latched record.
    pub(crate) fn should_abort(&mut self, current: &Payload) -> Option<WriteError> {
        let record = self.errors.get_mut(self.latched?)?;
        let first = !record.consumed;
        record.consumed = true;

        match self.policy {
            ErrorPolicy::Halt => Some(record.error.clone()),
            ErrorPolicy::Skip => {
                if first {
                    record.value = Some(current.clone());
                }
                None
            }
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn pending(&self) -> Vec<Payload> {
        self.pending.iter().cloned().collect()
    }

    pub(crate) fn history(&self) -> Arc<[ErrorRecord]> {
        Arc::from(self.errors.as_slice())
    }

    pub(crate) fn policy(&self) -> ErrorPolicy {
        self.policy
    }
}

/// [`QueueState`] shared between a controller, its hooks and its pacer.
#[derive(Clone, Debug)]
pub(crate) struct SharedQueue(Arc<Mutex<QueueState>>);

impl SharedQueue {
    pub(crate) fn new(policy: ErrorPolicy) -> Self {
        Self(Arc::new(Mutex::new(QueueState::new(policy))))
    }

    /// Locks the state. A panic elsewhere cannot leave it half-updated, so poison is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `payload` and runs `schedule` with the new depth under the
    /// same lock, so the mirrored queue and the pacer's channel see writes in
    /// the same order.
    ///
    /// If `schedule` reports failure the entry is taken back out.
    /// Returns the depth after the call.
    pub(crate) fn enqueue_then(
        &self,
        payload: Payload,
        schedule: impl FnOnce(usize) -> bool,
    ) -> usize {
        let mut state = self.lock();
        let depth = state.enqueue(payload);
        if schedule(depth) {
            depth
        } else {
            state.pending.pop_back();
            state.depth()
        }
    }
}
