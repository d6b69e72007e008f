//! # Sink abstraction.
//!
//! A [`Sink`] is a writable destination with a write-and-acknowledge contract.
//! The out-of-band error channel lives on the [`Stream`](crate::Stream) that
//! wraps the sink (see [`ErrorReporter`](crate::ErrorReporter)).
//!
//! ## Acknowledgment
//! Each write receives an [`Ack`]. How it is interpreted depends on
//! [`Sink::completion`], which is read once when the stream is hooked:
//!
//! ```text
//! Completion::Callback    → the write completes when `ack.done()` or `ack.fail()` is called;
//!                           dropping the ack without calling either = never acknowledged
//! Completion::Synchronous → the write completes when `write` returns, unless `ack.fail()`
//!                           was called before returning
//! ```
//!
//! A failed ack settles the write as a [`WriteError::Stream`](crate::WriteError::Stream).

use std::sync::Arc;

use tokio::sync::oneshot;

use super::Payload;

/// How a sink signals that a write is complete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Completion {
    /// The sink calls [`Ack::done`], possibly later and from another task.
    #[default]
    Callback,
    /// Returning from [`Sink::write`] is the acknowledgment.
    Synchronous,
}

/// One-shot completion handle passed to [`Sink::write`].
///
/// Completing it after the watchdog gave up on the write is a silent no-op.
#[derive(Debug)]
pub struct Ack {
    tx: Option<oneshot::Sender<AckResult>>,
}

/// What the watchdog receives: success or the sink's failure reason.
pub(crate) type AckResult = Result<(), Arc<str>>;

impl Ack {
    /// Creates an ack paired with the receiver the watchdog waits on.
    pub(crate) fn channel() -> (Self, oneshot::Receiver<AckResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// An ack nobody is waiting for (unhooked, direct writes).
    pub fn detached() -> Self {
        Self { tx: None }
    }

    /// True if nobody observes this ack.
    pub fn is_detached(&self) -> bool {
        self.tx.as_ref().is_none_or(|tx| tx.is_closed())
    }

    /// Acknowledges the write.
    pub fn done(self) {
        self.send(Ok(()));
    }

    /// Completes the write as failed.
    ///
    /// The write settles with a stream error carrying `reason`. Under
    /// [`ErrorPolicy::Halt`](crate::ErrorPolicy::Halt) the error is latched and
    /// the stream unhooked, as for [`Stream::report_error`](crate::Stream::report_error).
    pub fn fail(self, reason: impl Into<Arc<str>>) {
        self.send(Err(reason.into()));
    }

    fn send(mut self, res: AckResult) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(res);
        }
    }
}

/// # Writable destination.
///
/// Implementations should not block for long: the pacing loop calls
/// [`Sink::write`] inline and relies on [`Ack`] for slow completions.
///
/// # Example
/// ```
/// use decollide::{Ack, Completion, Payload, Sink};
///
/// struct Discard;
///
/// impl Sink for Discard {
///     fn write(&self, _payload: Payload, ack: Ack) {
///         ack.done();
///     }
/// }
///
/// assert_eq!(Discard.completion(), Completion::Callback);
/// ```
pub trait Sink: Send + Sync + 'static {
    /// Performs one write. `ack` must be completed for [`Completion::Callback`] sinks.
    fn write(&self, payload: Payload, ack: Ack);

    /// Acknowledgment style, read once at hook time. Default: [`Completion::Callback`].
    fn completion(&self) -> Completion {
        Completion::Callback
    }
}

/// Shared handle to a sink.
pub type SinkRef = Arc<dyn Sink>;
