//! # decollide
//!
//! **Decollide** serializes writes issued on several independent output
//! streams (typically stdout and stderr) into one paced chain, so they reach
//! their destinations in exactly the order they were issued.
//!
//! Each write is spaced by a minimum interval from the previous one, is given
//! a watchdog deadline, and settles (acknowledged or failed) before the next
//! write starts. Out-of-band stream failures either halt the chain or are
//! recorded and skipped.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Stream    │   │    Stream    │   │    Stream    │
//!     │   (stdout)   │   │   (stderr)   │   │  (any sink)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ write()          │ write()          │ write() / report_error()
//!            ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   HookLink   │   │   HookLink   │   │   HookLink   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────┬───────┴──────────────────┘
//!                       ▼  enqueue + schedule under one lock
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Controller                                                       │
//! │  - QueueState (pending writes, error history, latch)              │
//! │  - Pacer (one task, one ordered channel, one attempt at a time)   │
//! │  - Bus (broadcast events)                                         │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle of one write
//! ```text
//! Stream::write(payload)          (returns immediately)
//!   └─► QueueState::enqueue + Pacer channel send ─► publish WriteQueued
//!
//! Pacer loop {
//!   ├─► latched error + Halt?  ─► WriteFailed (no delay)
//!   ├─► sleep(interval)
//!   ├─► latched error + Halt?  ─► WriteFailed
//!   ├─► sink.write(payload, ack) raced against sleep(timeout)
//!   │       ├─ ack first      ─► WriteSettled
//!   │       └─ deadline first ─► WriteFailed(Timeout)
//!   └─► queue empty?           ─► Drained { last, history }
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                       |
//! |-------------------|--------------------------------------------------------------|------------------------------------------|
//! | **Control**       | Hook streams, pace and serialize their writes.               | [`Controller`], [`ControllerBuilder`]    |
//! | **Sinks**         | Plug any write target behind a hookable stream.              | [`Sink`], [`SinkFn`], [`StdSink`], [`Stream`] |
//! | **Policies**      | Halt or skip on out-of-band stream failures.                 | [`ErrorPolicy`]                          |
//! | **Events**        | Observe hooks, writes, failures and drains.                  | [`Event`], [`EventKind`], [`Subscribe`]  |
//! | **Errors**        | Typed errors for hooking and for queued writes.              | [`HookError`], [`WriteError`]            |
//! | **Configuration** | Interval, timeout, policy, bus capacity.                     | [`Config`]                               |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that renders events via `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use decollide::{Ack, Config, Controller, EventKind, Payload, SinkFn, Stream};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log = Arc::new(Mutex::new(Vec::new()));
//!     let sink = |log: Arc<Mutex<Vec<String>>>, tag: &'static str| {
//!         SinkFn::arc(move |p: Payload, ack: Ack| {
//!             log.lock().unwrap().push(format!("{tag}:{p}"));
//!             ack.done();
//!         })
//!     };
//!     let out = Stream::new("out", sink(log.clone(), "out"));
//!     let err = Stream::new("err", sink(log.clone(), "err"));
//!
//!     let cfg = Config { interval: Duration::from_millis(10), ..Config::default() };
//!     let ctl = Controller::builder(cfg)
//!         .with_stream(out.clone())
//!         .with_stream(err.clone())
//!         .build();
//!     ctl.hook_all()?;
//!
//!     let mut events = ctl.subscribe();
//!     out.write("1");
//!     err.write("2");
//!     out.write("3");
//!
//!     while let Ok(ev) = events.recv().await {
//!         if ev.kind == EventKind::Drained {
//!             break;
//!         }
//!     }
//!     assert_eq!(*log.lock().unwrap(), ["out:1", "err:2", "out:3"]);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod sinks;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Config, Controller, ControllerBuilder, ErrorRecord};
pub use error::{HookError, WriteError};
pub use events::{Event, EventKind};
pub use policies::ErrorPolicy;
pub use sinks::{Ack, Completion, ErrorReporter, Payload, Sink, SinkFn, SinkRef, StdSink, StdTarget, Stream};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
