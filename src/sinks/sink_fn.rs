//! # Function-backed sink (`SinkFn`)
//!
//! [`SinkFn`] wraps a closure `F: Fn(Payload, Ack)`, which is handy for tests,
//! in-memory capture, and adapting existing writers without a new type.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use decollide::{Ack, Payload, SinkFn, SinkRef, Stream};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink: SinkRef = {
//!     let seen = seen.clone();
//!     SinkFn::arc(move |p: Payload, ack: Ack| {
//!         seen.lock().unwrap().push(p.to_string());
//!         ack.done();
//!     })
//! };
//!
//! let out = Stream::new("out", sink);
//! out.write("hello");
//! assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
//! ```

use std::sync::Arc;

use super::{Ack, Completion, Payload, Sink};

/// Function-backed sink implementation.
#[derive(Debug)]
pub struct SinkFn<F> {
    f: F,
    completion: Completion,
}

impl<F> SinkFn<F> {
    /// Creates a sink that acknowledges through [`Ack::done`].
    pub fn new(f: F) -> Self {
        Self {
            f,
            completion: Completion::Callback,
        }
    }

    /// Creates a sink whose writes complete when the closure returns.
    pub fn synchronous(f: F) -> Self {
        Self {
            f,
            completion: Completion::Synchronous,
        }
    }
}

impl<F> SinkFn<F>
where
    F: Fn(Payload, Ack) + Send + Sync + 'static,
{
    /// Creates a callback sink and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> Sink for SinkFn<F>
where
    F: Fn(Payload, Ack) + Send + Sync + 'static,
{
    fn write(&self, payload: Payload, ack: Ack) {
        (self.f)(payload, ack)
    }

    fn completion(&self) -> Completion {
        self.completion
    }
}
