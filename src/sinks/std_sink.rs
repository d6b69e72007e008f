//! # Process standard streams.
//!
//! [`StdSink`] writes to the process stdout or stderr. Writes are synchronous
//! (`write_all` + `flush`). An I/O failure fails the write's [`Ack`]; when
//! nobody waits on the ack (the stream is not hooked) it is reported through
//! the owning stream's [`ErrorReporter`] instead.

use std::io::{self, Write};

use super::{Ack, Completion, ErrorReporter, Payload, Sink};

/// Which standard stream to write to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StdTarget {
    Stdout,
    Stderr,
}

impl StdTarget {
    /// Conventional stream name.
    pub fn name(self) -> &'static str {
        match self {
            StdTarget::Stdout => "stdout",
            StdTarget::Stderr => "stderr",
        }
    }
}

/// Sink over the process stdout/stderr.
pub struct StdSink {
    target: StdTarget,
    errors: ErrorReporter,
}

impl StdSink {
    pub(crate) fn new(target: StdTarget, errors: ErrorReporter) -> Self {
        Self { target, errors }
    }

    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        match self.target {
            StdTarget::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            StdTarget::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(bytes)?;
                err.flush()
            }
        }
    }
}

impl Sink for StdSink {
    fn write(&self, payload: Payload, ack: Ack) {
        match self.write_bytes(payload.as_bytes()) {
            Ok(()) => ack.done(),
            Err(e) if ack.is_detached() => self.errors.report(e.to_string()),
            Err(e) => ack.fail(e.to_string()),
        }
    }

    fn completion(&self) -> Completion {
        Completion::Synchronous
    }
}
