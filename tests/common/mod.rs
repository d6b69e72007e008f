#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use decollide::{Ack, Event, EventKind, Payload, SinkFn, Stream};
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

/// One write that reached a sink.
#[derive(Clone, Debug)]
pub struct Written {
    pub stream: String,
    pub payload: String,
    pub at: Instant,
}

pub type Log = Arc<Mutex<Vec<Written>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// A stream whose sink appends to `log` and acknowledges at once.
pub fn recording(name: &'static str, log: &Log) -> Stream {
    let log = Arc::clone(log);
    Stream::new(
        name,
        SinkFn::arc(move |p: Payload, ack: Ack| {
            log.lock().unwrap().push(Written {
                stream: name.to_string(),
                payload: p.to_string(),
                at: Instant::now(),
            });
            ack.done();
        }),
    )
}

/// A stream whose sink never acknowledges; the acks are kept for the test.
pub fn stalled(name: &'static str) -> (Stream, Arc<Mutex<Vec<Ack>>>) {
    let held = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let held = Arc::clone(&held);
        SinkFn::arc(move |_p: Payload, ack: Ack| held.lock().unwrap().push(ack))
    };
    (Stream::new(name, sink), held)
}

pub fn payloads(log: &Log) -> Vec<String> {
    log.lock().unwrap().iter().map(|w| w.payload.clone()).collect()
}

/// Receives events until one of `kind` arrives.
pub async fn until(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    collect_until(rx, kind).await.pop().expect("at least the awaited event")
}

/// Receives events up to and including the first one of `kind`.
pub async fn collect_until(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Vec<Event> {
    let fut = async {
        let mut seen = Vec::new();
        loop {
            let ev = rx.recv().await.expect("bus open");
            let done = ev.kind == kind;
            seen.push(ev);
            if done {
                return seen;
            }
        }
    };
    time::timeout(Duration::from_secs(120), fut)
        .await
        .unwrap_or_else(|_| panic!("no {kind:?} event"))
}

/// Drains whatever is already buffered in `rx`.
pub fn buffered(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}
