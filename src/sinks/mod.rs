//! Sinks and the hookable streams that wrap them.
//!
//! ## Contents
//! - [`Payload`] opaque, cheaply cloneable write payload
//! - [`Sink`], [`Ack`], [`Completion`] the canonical write-and-acknowledge contract
//! - [`SinkFn`] closure-backed sink
//! - [`StdSink`] process stdout/stderr
//! - [`Stream`] named write entry point with a hook slot
//! - [`ErrorReporter`] out-of-band failure channel of a stream

mod payload;
mod sink;
mod sink_fn;
mod std_sink;
mod stream;

pub use payload::Payload;
pub use sink::{Ack, Completion, Sink, SinkRef};
pub use sink_fn::SinkFn;
pub use std_sink::{StdSink, StdTarget};
pub use stream::{ErrorReporter, Stream};
