//! # Hookable write entry point.
//!
//! A [`Stream`] pairs a named [`Sink`] with a hook slot. Callers always write
//! through the stream; whether the write goes straight to the sink or through
//! a [`Controller`](crate::Controller) depends on whether the slot is occupied.
//!
//! ## Routing
//! ```text
//! Stream::write(payload)
//!   ├─ slot empty  ──► sink.write(payload, Ack::detached())
//!   └─ slot hooked ──► HookLink::write ──► QueueState + Pacer (returns immediately)
//!
//! Stream::report_error(reason)
//!   ├─ slot empty  ──► logged, otherwise dropped
//!   └─ slot hooked ──► HookLink::on_error ──► latch + StreamFailed (+ unhook on Halt)
//! ```
//!
//! ## Rules
//! - At most one hook per stream (the occupied slot is the "already hooked" marker).
//! - Only the owning controller can clear the slot.
//! - The sink never changes; a hook only changes routing, so unhooking restores
//!   the original write path exactly.

use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};

use crate::core::{HookLink, OwnerId};
use crate::error::HookError;

use super::{Ack, Payload, SinkRef, StdSink, StdTarget};

static STDOUT: LazyLock<Stream> = LazyLock::new(|| Stream::standard(StdTarget::Stdout));
static STDERR: LazyLock<Stream> = LazyLock::new(|| Stream::standard(StdTarget::Stderr));

struct StreamInner {
    name: Arc<str>,
    sink: SinkRef,
    hook: Mutex<Option<Arc<HookLink>>>,
}

/// Cloneable handle to a named, hookable sink.
///
/// Clones share the same hook slot.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<StreamInner>,
}

impl Stream {
    /// Wraps `sink` under the given name.
    pub fn new(name: impl Into<Arc<str>>, sink: SinkRef) -> Self {
        Self {
            inner: Arc::new(StreamInner {
                name: name.into(),
                sink,
                hook: Mutex::new(None),
            }),
        }
    }

    /// The process-wide stream over stdout.
    ///
    /// Every call returns a handle to the same stream, so stdout has a single
    /// hook slot no matter how many controllers ask for it.
    pub fn stdout() -> Self {
        STDOUT.clone()
    }

    /// The process-wide stream over stderr. See [`Stream::stdout`].
    pub fn stderr() -> Self {
        STDERR.clone()
    }

    fn standard(target: StdTarget) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<StreamInner>| {
            let reporter = ErrorReporter::from_weak(weak.clone());
            StreamInner {
                name: Arc::from(target.name()),
                sink: Arc::new(StdSink::new(target, reporter)),
                hook: Mutex::new(None),
            }
        });
        Self { inner }
    }

    /// Stream name, used in events and errors.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Writes `payload`.
    ///
    /// Never blocks on pacing: when hooked, the payload is queued and this
    /// returns at once. Failures are reported asynchronously via events.
    pub fn write(&self, payload: impl Into<Payload>) {
        let payload = payload.into();
        let link = self.slot().clone();
        match link {
            Some(link) => link.write(self, payload),
            None => self.inner.sink.write(payload, Ack::detached()),
        }
    }

    /// Reports an out-of-band sink failure (e.g. a broken pipe).
    pub fn report_error(&self, reason: impl Into<Arc<str>>) {
        let reason = reason.into();
        let link = self.slot().clone();
        match link {
            Some(link) => link.on_error(self, reason),
            None => {
                tracing::warn!(stream = %self.inner.name, %reason, "unhandled stream error");
            }
        }
    }

    /// A weak handle sinks can keep to report their own failures.
    pub fn reporter(&self) -> ErrorReporter {
        ErrorReporter::from_weak(Arc::downgrade(&self.inner))
    }

    /// True while a controller owns this stream.
    pub fn is_hooked(&self) -> bool {
        self.slot().is_some()
    }

    /// True if both handles refer to the same stream.
    pub fn ptr_eq(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.inner.name)
    }

    pub(crate) fn sink(&self) -> &SinkRef {
        &self.inner.sink
    }

    /// Occupies the hook slot, failing if it is already taken.
    pub(crate) fn install(&self, link: Arc<HookLink>) -> Result<(), HookError> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(HookError::AlreadyHooked {
                stream: self.name_arc(),
            });
        }
        *slot = Some(link);
        Ok(())
    }

    /// Clears the slot if `owner` holds it. Returns `true` if something was removed.
    pub(crate) fn release(&self, owner: OwnerId) -> bool {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some(link) if link.owner() == owner => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.slot().as_ref().is_some_and(|l| l.owner() == owner)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<HookLink>>> {
        self.inner.hook.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn from_inner(inner: Arc<StreamInner>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("name", &self.inner.name)
            .field("hooked", &self.is_hooked())
            .finish()
    }
}

/// Weak handle for reporting failures on a [`Stream`] without keeping it alive.
#[derive(Clone)]
pub struct ErrorReporter {
    inner: Weak<StreamInner>,
}

impl ErrorReporter {
    fn from_weak(inner: Weak<StreamInner>) -> Self {
        Self { inner }
    }

    /// Forwards to [`Stream::report_error`]; a no-op once the stream is gone.
    pub fn report(&self, reason: impl Into<Arc<str>>) {
        if let Some(inner) = self.inner.upgrade() {
            Stream::from_inner(inner).report_error(reason);
        }
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
