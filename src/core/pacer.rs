//! # Pacer: the single shared write chain.
//!
//! One pacer per controller serves every hooked stream. Writes reach it as
//! [`Job`]s over one ordered channel; a single loop runs them one after the
//! other, so the channel order **is** the output order.
//!
//! ## Architecture
//! ```text
//! HookLink(stdout) ──┐
//! HookLink(stderr) ──┼──► mpsc (ordered) ──► Pacer::run()
//! HookLink(...)    ──┘
//!
//! loop {
//!   ├─► job = rx.recv()
//!   ├─► should_abort()?          ── yes ─► fail now (no delay)
//!   ├─► sleep(interval)
//!   ├─► should_abort()?          ── yes ─► fail
//!   ├─► watchdog::attempt()      ── timeout | ack.fail() ─► fail
//!   ├─► settle(err?)             ─► WriteSettled | WriteFailed
//!   │     ├─ aborted by the latch    ─► unhook job's stream
//!   │     └─ failed by its sink      ─► latch + unhook (Halt only)
//!   └─► queue empty?             ─► Drained
//! }
//! ```
//!
//! ## Rules
//! - At most **one** attempt is in flight at any instant, across all streams
//! - Every job settles exactly once, success or failure
//! - An error that lands during the pacing sleep aborts the write that was
//!   sleeping (the latch is checked again after the sleep)
//! - Timeouts never unhook; stream errors do under `Halt`

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time;

use crate::core::config::Settings;
use crate::core::hook::OwnerId;
use crate::core::queue::SharedQueue;
use crate::core::watchdog;
use crate::error::WriteError;
use crate::events::{Bus, Event, EventKind};
use crate::sinks::{Completion, Payload, Stream};

/// A write waiting for its turn.
pub(crate) struct Job {
    /// Stream the write was issued on; its sink is the write target even if
    /// the stream is unhooked before the job runs.
    pub stream: Stream,
    pub payload: Payload,
    /// Acknowledgment mode captured at hook time.
    pub completion: Completion,
}

/// Sending side of the pacer's channel.
#[derive(Clone, Debug)]
pub(crate) struct PacerHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl PacerHandle {
    /// Appends a job. Returns `false` if the pacer is gone.
    pub(crate) fn schedule(&self, job: Job) -> bool {
        self.tx.send(job).is_ok()
    }
}

/// How a job ended.
enum Outcome {
    Written,
    /// A pacing check observed the latched error.
    Aborted(WriteError),
    /// The attempt timed out or the sink failed the ack.
    Failed(WriteError),
}

/// Consumer loop of the write chain.
pub(crate) struct Pacer {
    rx: mpsc::UnboundedReceiver<Job>,
    owner: OwnerId,
    queue: SharedQueue,
    settings: Arc<Settings>,
    bus: Bus,
}

impl Pacer {
    pub(crate) fn new(
        owner: OwnerId,
        queue: SharedQueue,
        settings: Arc<Settings>,
        bus: Bus,
    ) -> (Self, PacerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pacer = Self {
            rx,
            owner,
            queue,
            settings,
            bus,
        };
        (pacer, PacerHandle { tx })
    }

    /// Runs jobs in arrival order until every [`PacerHandle`] is dropped.
    pub(crate) async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            let outcome = self.step(&job).await;
            self.finish(job, outcome);
        }
        tracing::debug!(owner = ?self.owner, "pacer stopped");
    }

    async fn step(&self, job: &Job) -> Outcome {
        if let Err(err) = self.check(job) {
            return Outcome::Aborted(err);
        }
        time::sleep(self.settings.interval()).await;
        if let Err(err) = self.check(job) {
            return Outcome::Aborted(err);
        }
        let res = watchdog::attempt(
            &job.stream,
            job.completion,
            job.payload.clone(),
            self.settings.timeout(),
        )
        .await;
        match res {
            Ok(_) => Outcome::Written,
            Err(err) => Outcome::Failed(err),
        }
    }

    fn check(&self, job: &Job) -> Result<(), WriteError> {
        match self.queue.lock().should_abort(&job.payload) {
            Some(err) => {
                tracing::debug!(stream = %job.stream.name(), payload = %job.payload, "aborted by latched error");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn finish(&self, job: Job, outcome: Outcome) {
        let (settlement, failed) = {
            let mut state = self.queue.lock();
            match outcome {
                Outcome::Written => (state.settle(None), None),
                Outcome::Aborted(err) => (state.settle(Some(err.clone())), Some((err, true))),
                Outcome::Failed(err) if err.is_stream_failure() => {
                    let (settlement, halts) = state.settle_sink_failure(err.clone());
                    (settlement, Some((err, halts)))
                }
                Outcome::Failed(err) => (state.settle(Some(err.clone())), Some((err, false))),
            }
        };

        match failed {
            None => {
                self.bus.publish(
                    Event::new(EventKind::WriteSettled)
                        .with_stream(job.stream.name_arc())
                        .with_payload(job.payload.clone())
                        .with_depth(settlement.depth),
                );
            }
            Some((err, unhook)) => {
                self.bus.publish(
                    Event::new(EventKind::WriteFailed)
                        .with_stream(job.stream.name_arc())
                        .with_payload(job.payload.clone())
                        .with_error(err.clone())
                        .with_depth(settlement.depth),
                );
                if unhook && job.stream.release(self.owner) {
                    tracing::debug!(stream = %job.stream.name(), "unhooked after stream failure");
                    self.bus.publish(
                        Event::new(EventKind::Unhooked)
                            .with_stream(job.stream.name_arc())
                            .with_error(err),
                    );
                }
            }
        }

        if let Some(drain) = settlement.drained {
            tracing::debug!(errors = drain.history.len(), "queue drained");
            let mut ev = Event::new(EventKind::Drained)
                .with_depth(0)
                .with_history(drain.history);
            if let Some(last) = drain.last {
                ev = ev.with_payload(last);
            }
            self.bus.publish(ev);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::sinks::{Ack, SinkFn};
    use crate::{Config, Controller, ErrorPolicy};

    fn recorder(name: &str) -> (Stream, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            SinkFn::arc(move |p: Payload, ack: Ack| {
                seen.lock().unwrap().push(p.to_string());
                ack.done();
            })
        };
        (Stream::new(name, sink), seen)
    }

    async fn next_failure_or_settle(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Event {
        loop {
            let ev = rx.recv().await.expect("bus open");
            if matches!(ev.kind, EventKind::WriteSettled | EventKind::WriteFailed) {
                return ev;
            }
        }
    }

    // A stream error that lands while a write is in its pacing sleep aborts
    // that write, even though it passed the check before the sleep.
    #[tokio::test(start_paused = true)]
    async fn error_during_pacing_sleep_aborts_sleeping_write() {
        let (out, seen) = recorder("out");
        let ctl = Controller::builder(Config::default())
            .with_stream(out.clone())
            .build();
        ctl.hook_all().unwrap();
        let mut rx = ctl.subscribe();

        out.write("first");
        time::sleep(Duration::from_millis(50)).await;
        out.report_error("broken pipe");

        let ev = next_failure_or_settle(&mut rx).await;
        assert_eq!(ev.kind, EventKind::WriteFailed);
        assert_eq!(ev.payload, Some(Payload::from("first")));
        assert!(ev.error.is_some_and(|e| e.is_stream_failure()));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn latched_error_fails_without_pacing_delay() {
        let (out, _) = recorder("out");
        let (err, seen_err) = recorder("err");
        let ctl = Controller::builder(Config::default())
            .with_stream(out.clone())
            .with_stream(err.clone())
            .build();
        ctl.hook_all().unwrap();
        let mut rx = ctl.subscribe();

        out.report_error("closed");
        let start = time::Instant::now();
        err.write("after latch");

        let ev = next_failure_or_settle(&mut rx).await;
        assert_eq!(ev.kind, EventKind::WriteFailed);
        assert!(start.elapsed() < ctl.interval());
        assert!(seen_err.lock().unwrap().is_empty());
        assert_eq!(ctl.policy(), ErrorPolicy::Halt);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_still_runs_one_at_a_time() {
        let held: Arc<Mutex<Vec<Ack>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let held = held.clone();
            SinkFn::arc(move |_p: Payload, ack: Ack| held.lock().unwrap().push(ack))
        };
        let out = Stream::new("out", sink);
        let cfg = Config {
            interval: Duration::ZERO,
            timeout: Duration::from_secs(10),
            ..Config::default()
        };
        let ctl = Controller::builder(cfg).with_stream(out.clone()).build();
        ctl.hook_all().unwrap();

        out.write("a");
        out.write("b");
        time::sleep(Duration::from_millis(5)).await;
        // "b" is not attempted while "a" is unacknowledged.
        assert_eq!(held.lock().unwrap().len(), 1);

        let first = held.lock().unwrap().remove(0);
        first.done();
        time::sleep(Duration::from_millis(5)).await;
        assert_eq!(held.lock().unwrap().len(), 1);
        assert_eq!(ctl.depth(), 1);
    }
}
