mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{buffered, collect_until, log, payloads, recording, until};
use decollide::{Config, Controller, EventKind, WriteError};
use tokio::time;

fn paced(ms: u64) -> Config {
    Config {
        interval: Duration::from_millis(ms),
        ..Config::default()
    }
}

#[tokio::test(start_paused = true)]
async fn settlement_order_matches_issuance_across_streams() {
    let log = log();
    let out = recording("stdout", &log);
    let err = recording("stderr", &log);
    let ctl = Controller::builder(paced(10))
        .with_stream(out.clone())
        .with_stream(err.clone())
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    let counter = Arc::new(AtomicUsize::new(0));
    let mut tasks = Vec::new();
    for i in 0..12 {
        let stream = if i % 3 == 0 { err.clone() } else { out.clone() };
        let counter = Arc::clone(&counter);
        tasks.push(tokio::spawn(async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            stream.write(n.to_string());
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    let events = collect_until(&mut rx, EventKind::Drained).await;
    let settled: Vec<String> = events
        .iter()
        .filter(|e| e.kind == EventKind::WriteSettled)
        .filter_map(|e| e.payload.as_ref().map(|p| p.to_string()))
        .collect();

    let expected: Vec<String> = (0..12).map(|n| n.to_string()).collect();
    assert_eq!(payloads(&log), expected);
    assert_eq!(settled, expected);
}

#[tokio::test(start_paused = true)]
async fn attempts_are_spaced_by_the_interval() {
    let log = log();
    let out = recording("stdout", &log);
    let err = recording("stderr", &log);
    let ctl = Controller::builder(paced(100))
        .with_streams([out.clone(), err.clone()])
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    let start = time::Instant::now();
    for i in 0..6 {
        if i % 2 == 0 { out.write(format!("{i}")) } else { err.write(format!("{i}")) }
    }
    until(&mut rx, EventKind::Drained).await;

    let written = log.lock().unwrap().clone();
    assert_eq!(written.len(), 6);
    assert!(written[0].at - start >= Duration::from_millis(90));
    for pair in written.windows(2) {
        let gap = pair[1].at - pair[0].at;
        assert!(
            gap >= Duration::from_millis(90) && gap <= Duration::from_millis(150),
            "gap {gap:?} out of bounds"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn alternating_writes_drain_exactly_once() {
    let log = log();
    let out = recording("stdout", &log);
    let err = recording("stderr", &log);
    let ctl = Controller::builder(paced(100))
        .with_stream(out.clone())
        .with_stream(err.clone())
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    for i in 0..18 {
        let s = if i % 2 == 0 { &out } else { &err };
        s.write(format!("line {i}"));
    }
    assert!(ctl.is_writing());
    assert_eq!(ctl.depth(), 18);
    assert_eq!(ctl.pending().first().map(|p| p.to_string()).as_deref(), Some("line 0"));

    let events = collect_until(&mut rx, EventKind::Drained).await;
    let drain = events.last().unwrap();
    assert_eq!(drain.depth, Some(0));
    assert_eq!(drain.payload.as_ref().map(|p| p.to_string()).as_deref(), Some("line 17"));
    assert!(drain.history.as_ref().is_some_and(|h| h.is_empty()));
    assert_eq!(
        events.iter().filter(|e| e.kind == EventKind::WriteSettled).count(),
        18
    );

    time::sleep(Duration::from_secs(5)).await;
    assert!(!buffered(&mut rx).iter().any(|e| e.is_drain()));
    assert!(!ctl.is_writing());
    assert_eq!(log.lock().unwrap().len(), 18);
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_fails_every_attempt_but_still_drains() {
    let log = log();
    let out = recording("stdout", &log);
    let cfg = Config {
        interval: Duration::from_millis(20),
        timeout: Duration::ZERO,
        ..Config::default()
    };
    let ctl = Controller::builder(cfg).with_stream(out.clone()).build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    for i in 0..5 {
        out.write(format!("{i}"));
    }
    let events = collect_until(&mut rx, EventKind::Drained).await;

    assert_eq!(events.iter().filter(|e| e.kind == EventKind::WriteSettled).count(), 0);
    assert_eq!(events.iter().filter(|e| e.kind == EventKind::WriteFailed).count(), 5);

    let history = events.last().and_then(|e| e.history.clone()).unwrap();
    assert_eq!(history.len(), 5);
    for (i, rec) in history.iter().enumerate() {
        assert!(matches!(rec.error, WriteError::Timeout { timeout, .. } if timeout == Duration::ZERO));
        assert_eq!(rec.value.as_ref().map(|p| p.to_string()), Some(i.to_string()));
        assert_eq!(rec.position, 4 - i);
    }
    assert_eq!(ctl.depth(), 0);
    // The sink is still invoked; only its acknowledgment is abandoned.
    assert_eq!(log.lock().unwrap().len(), 5);
    // Timeouts never unhook.
    assert!(out.is_hooked());
}
