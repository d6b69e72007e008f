//! # Controller: owns one write chain and the streams routed through it.
//!
//! The [`Controller`] owns the queue state, the pacer's sending side, the event
//! bus, and the list of streams it may hook. Every stream it hooks shares the
//! same chain, so writes settle in issuance order across all of them.
//!
//! ## Key responsibilities
//! - hook and unhook streams (all at once or individually)
//! - expose queue snapshots (`depth`, `pending`, `errors`)
//! - adjust the per-attempt timeout at runtime
//! - hand out event receivers via [`Controller::subscribe`]
//!
//! ## High-level architecture
//! ```text
//! ControllerBuilder::build()
//!   ├─► SharedQueue::new(policy)
//!   ├─► Pacer::new(..) ─► tokio::spawn(pacer.run())
//!   └─► subscriber listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! hook_all()
//!   for stream in streams:
//!     ├─ hook(stream)  ─► Ok ─► remember for rollback
//!     └─ AlreadyHooked ─► unhook everything hooked in this call, return Err
//!
//! Drop ─► unhook_all()   (scheduled jobs still run, then the pacer exits)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use decollide::{Ack, Config, Controller, EventKind, Payload, SinkFn, Stream};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let out = Stream::new("out", SinkFn::arc(|_p: Payload, ack: Ack| ack.done()));
//!     let err = Stream::new("err", SinkFn::arc(|_p: Payload, ack: Ack| ack.done()));
//!
//!     let cfg = Config { interval: Duration::from_millis(5), ..Config::default() };
//!     let ctl = Controller::builder(cfg)
//!         .with_stream(out.clone())
//!         .with_stream(err.clone())
//!         .build();
//!     ctl.hook_all()?;
//!
//!     let mut events = ctl.subscribe();
//!     out.write("first");
//!     err.write("second");
//!
//!     while let Ok(ev) = events.recv().await {
//!         if ev.kind == EventKind::Drained {
//!             break;
//!         }
//!     }
//!     ctl.unhook_all();
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;

use super::builder::ControllerBuilder;
use super::config::{Config, Settings};
use super::hook::{self, OwnerId};
use super::pacer::PacerHandle;
use super::queue::{ErrorRecord, SharedQueue};
use crate::error::HookError;
use crate::events::{Bus, Event};
use crate::policies::ErrorPolicy;
use crate::sinks::{Payload, Stream};

/// Serializes and paces writes across every stream it hooks.
pub struct Controller {
    id: OwnerId,
    cfg: Config,
    settings: Arc<Settings>,
    queue: SharedQueue,
    bus: Bus,
    pacer: PacerHandle,
    streams: Mutex<Vec<Stream>>,
}

impl Controller {
    /// Starts building a controller with the given configuration.
    pub fn builder(cfg: Config) -> ControllerBuilder {
        ControllerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        id: OwnerId,
        cfg: Config,
        settings: Arc<Settings>,
        queue: SharedQueue,
        bus: Bus,
        pacer: PacerHandle,
        streams: Vec<Stream>,
    ) -> Self {
        Self {
            id,
            cfg,
            settings,
            queue,
            bus,
            pacer,
            streams: Mutex::new(streams),
        }
    }

    /// Hooks every registered stream.
    ///
    /// Fails with [`HookError::AlreadyHooked`] if any registered stream is
    /// already hooked, including by this controller. The streams hooked by
    /// this call are then unhooked again; existing hooks stay untouched.
    pub fn hook_all(&self) -> Result<(), HookError> {
        let streams = self.streams_snapshot();
        let mut hooked = Vec::with_capacity(streams.len());

        for stream in &streams {
            if let Err(e) = self.install(stream) {
                tracing::warn!(stream = %stream.name(), error = %e, "hook_all rolled back");
                for s in &hooked {
                    hook::unhook(s, self.id, &self.bus);
                }
                return Err(e);
            }
            hooked.push(stream.clone());
        }
        Ok(())
    }

    /// Unhooks every registered stream, regardless of queue depth.
    ///
    /// Writes already scheduled still run against their stream's sink.
    pub fn unhook_all(&self) {
        for stream in self.streams_snapshot() {
            hook::unhook(&stream, self.id, &self.bus);
        }
    }

    /// Hooks a single stream, registering it with this controller if needed.
    pub fn hook(&self, stream: &Stream) -> Result<(), HookError> {
        self.install(stream)?;
        let mut streams = self.streams_lock();
        if !streams.iter().any(|s| s.ptr_eq(stream)) {
            streams.push(stream.clone());
        }
        Ok(())
    }

    /// Unhooks a single stream. Returns `false` if this controller did not own it.
    pub fn unhook(&self, stream: &Stream) -> bool {
        hook::unhook(stream, self.id, &self.bus)
    }

    /// A receiver for events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Number of writes queued or in flight.
    pub fn depth(&self) -> usize {
        self.queue.lock().depth()
    }

    /// True while at least one write has not settled yet.
    pub fn is_writing(&self) -> bool {
        self.depth() > 0
    }

    /// Payloads still waiting to settle, oldest first.
    pub fn pending(&self) -> Vec<Payload> {
        self.queue.lock().pending()
    }

    /// Every error recorded so far, in recording order.
    pub fn errors(&self) -> Arc<[ErrorRecord]> {
        self.queue.lock().history()
    }

    /// Spacing between consecutive write attempts.
    pub fn interval(&self) -> Duration {
        self.settings.interval()
    }

    /// Current per-attempt watchdog duration.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout()
    }

    /// Changes the watchdog duration; applies from the next attempt.
    pub fn set_timeout(&self, timeout: Duration) {
        tracing::debug!(?timeout, "timeout changed");
        self.settings.set_timeout(timeout);
    }

    /// Policy applied to latched stream errors.
    pub fn policy(&self) -> ErrorPolicy {
        self.queue.lock().policy()
    }

    /// Current configuration: the build-time values with the live timeout.
    pub fn config(&self) -> Config {
        Config {
            timeout: self.timeout(),
            ..self.cfg.clone()
        }
    }

    /// Streams registered with this controller, hooked or not.
    pub fn streams(&self) -> Vec<Stream> {
        self.streams_snapshot()
    }

    fn install(&self, stream: &Stream) -> Result<(), HookError> {
        hook::hook(stream, self.id, &self.queue, &self.pacer, &self.bus)
    }

    fn streams_lock(&self) -> MutexGuard<'_, Vec<Stream>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn streams_snapshot(&self) -> Vec<Stream> {
        self.streams_lock().clone()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.unhook_all();
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("cfg", &self.cfg)
            .field("depth", &self.depth())
            .field("receivers", &self.bus.receivers())
            .finish()
    }
}
