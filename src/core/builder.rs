use std::sync::Arc;

use crate::{
    core::Config,
    events::Bus,
    sinks::Stream,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    config::Settings, controller::Controller, hook::OwnerId, pacer::Pacer, queue::SharedQueue,
};

/// Builder for constructing a [`Controller`] with its streams and subscribers.
pub struct ControllerBuilder {
    cfg: Config,
    streams: Vec<Stream>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ControllerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            streams: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Registers a stream for [`Controller::hook_all`].
    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.streams.push(stream);
        self
    }

    /// Registers several streams, in order.
    pub fn with_streams(mut self, streams: impl IntoIterator<Item = Stream>) -> Self {
        self.streams.extend(streams);
        self
    }

    /// Registers the process-wide stdout and stderr streams.
    pub fn with_stdio(self) -> Self {
        self.with_stream(Stream::stdout()).with_stream(Stream::stderr())
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive controller events (hooks, writes, failures, drains)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the controller. Nothing is hooked yet.
    ///
    /// Must be called inside a tokio runtime: this spawns the pacer and,
    /// when subscribers were given, the listener feeding them.
    pub fn build(self) -> Controller {
        let id = OwnerId::next();
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let settings = Arc::new(Settings::new(&self.cfg));
        let queue = SharedQueue::new(self.cfg.policy);

        if !self.subscribers.is_empty() {
            let subs = Arc::new(SubscriberSet::new(self.subscribers));
            subscriber_listener(&bus, subs);
        }

        let (pacer, handle) = Pacer::new(id, queue.clone(), Arc::clone(&settings), bus.clone());
        tokio::spawn(pacer.run());

        Controller::new_internal(id, self.cfg, settings, queue, bus, handle, self.streams)
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) {
    use tokio::sync::broadcast::error::RecvError;

    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "subscriber listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
