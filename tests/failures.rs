mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{collect_until, log, payloads, recording, stalled, until};
use decollide::{Ack, Config, Controller, ErrorPolicy, Event, EventKind, Payload, SinkFn, Stream};
use tokio::time;

fn nine_writes_with_error_at_450ms(policy: ErrorPolicy) -> Config {
    Config {
        interval: Duration::from_millis(100),
        policy,
        ..Config::default()
    }
}

fn count(events: &[Event], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

#[tokio::test(start_paused = true)]
async fn halt_aborts_everything_after_the_latched_error() {
    let log = log();
    let out = recording("stdout", &log);
    let ctl = Controller::builder(nine_writes_with_error_at_450ms(ErrorPolicy::Halt))
        .with_stream(out.clone())
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    for i in 1..=9 {
        out.write(i.to_string());
    }
    time::sleep(Duration::from_millis(450)).await;
    out.report_error("broken pipe");
    // Halt unhooks the failing stream at once.
    assert!(!out.is_hooked());

    let events = collect_until(&mut rx, EventKind::Drained).await;
    assert_eq!(payloads(&log), ["1", "2", "3", "4"]);
    assert_eq!(count(&events, EventKind::WriteSettled), 4);
    assert_eq!(count(&events, EventKind::WriteFailed), 5);
    assert_eq!(count(&events, EventKind::StreamFailed), 1);
    assert_eq!(count(&events, EventKind::Unhooked), 1);

    let drain = events.last().unwrap();
    let history = drain.history.clone().unwrap();
    assert_eq!(history.len(), 6);
    assert!(history.iter().all(|r| r.error.is_stream_failure()));
    assert_eq!(history[0].value, None);
    assert!(history[0].consumed);
    assert_eq!(history[1].value, Some(Payload::from("5")));
    assert_eq!(ctl.depth(), 0);
    assert_eq!(ctl.errors().len(), 6);

    // Unhooked: writes go straight to the sink again.
    out.write("direct");
    assert_eq!(payloads(&log).last().map(String::as_str), Some("direct"));
}

#[tokio::test(start_paused = true)]
async fn skip_records_the_error_once_and_keeps_writing() {
    let log = log();
    let out = recording("stdout", &log);
    let ctl = Controller::builder(nine_writes_with_error_at_450ms(ErrorPolicy::Skip))
        .with_stream(out.clone())
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    for i in 1..=9 {
        out.write(i.to_string());
    }
    time::sleep(Duration::from_millis(450)).await;
    out.report_error("broken pipe");
    assert!(out.is_hooked());

    let events = collect_until(&mut rx, EventKind::Drained).await;
    let expected: Vec<String> = (1..=9).map(|i| i.to_string()).collect();
    assert_eq!(payloads(&log), expected);
    assert_eq!(count(&events, EventKind::WriteSettled), 9);
    assert_eq!(count(&events, EventKind::WriteFailed), 0);
    assert_eq!(count(&events, EventKind::StreamFailed), 1);
    assert_eq!(count(&events, EventKind::Drained), 1);

    let history = events.last().and_then(|e| e.history.clone()).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].value, Some(Payload::from("5")));
    assert!(history[0].consumed);
}

#[tokio::test(start_paused = true)]
async fn stream_failure_is_reported_immediately() {
    let log = log();
    let out = recording("stdout", &log);
    let ctl = Controller::builder(Config::default())
        .with_stream(out.clone())
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    out.write("a");
    out.write("b");
    out.report_error("EPIPE");

    let ev = until(&mut rx, EventKind::StreamFailed).await;
    assert_eq!(ev.stream.as_deref(), Some("stdout"));
    assert_eq!(ev.depth, Some(2));
    assert_eq!(ev.error.map(|e| e.as_label()), Some("write_stream_failed"));
}

#[tokio::test(start_paused = true)]
async fn stalled_sink_times_out_and_late_ack_is_ignored() {
    let (out, held) = stalled("stdout");
    let cfg = Config {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        ..Config::default()
    };
    let ctl = Controller::builder(cfg).with_stream(out.clone()).build();
    ctl.hook_all().unwrap();
    ctl.set_timeout(Duration::from_millis(50));
    let mut rx = ctl.subscribe();

    let start = time::Instant::now();
    out.write("stuck");
    let failed = until(&mut rx, EventKind::WriteFailed).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(60) && elapsed < Duration::from_millis(100));
    assert!(failed.error.as_ref().is_some_and(|e| e.is_timeout()));
    until(&mut rx, EventKind::Drained).await;

    for ack in held.lock().unwrap().drain(..) {
        ack.done();
    }
    time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(ctl.errors().len(), 1);
    assert!(out.is_hooked());
}

/// Records every write like [`recording`], but fails the ack for "bad".
/// Completes synchronously, the way the standard streams do.
fn failing_on_bad(name: &'static str, log: &common::Log) -> Stream {
    let inner = recording(name, log);
    Stream::new(
        name,
        Arc::new(SinkFn::synchronous(move |p: Payload, ack: Ack| {
            if p == "bad" {
                ack.fail("write: broken pipe");
            } else {
                inner.write(p);
                drop(ack);
            }
        })),
    )
}

#[tokio::test(start_paused = true)]
async fn failed_write_settles_as_failure_and_skip_keeps_going() {
    let log = log();
    let out = failing_on_bad("stdout", &log);
    let ctl = Controller::builder(nine_writes_with_error_at_450ms(ErrorPolicy::Skip))
        .with_stream(out.clone())
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    out.write("1");
    out.write("bad");
    out.write("3");
    let events = collect_until(&mut rx, EventKind::Drained).await;

    let failed: Vec<_> = events.iter().filter(|e| e.kind == EventKind::WriteFailed).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].payload, Some(Payload::from("bad")));
    assert!(failed[0].error.as_ref().is_some_and(|e| e.is_stream_failure()));
    assert_eq!(count(&events, EventKind::WriteSettled), 2);
    assert_eq!(count(&events, EventKind::Unhooked), 0);

    assert!(out.is_hooked());
    assert_eq!(payloads(&log), ["1", "3"]);
    let errors = ctl.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].value, Some(Payload::from("bad")));
}

#[tokio::test(start_paused = true)]
async fn failed_write_under_halt_aborts_the_rest_and_unhooks() {
    let log = log();
    let out = failing_on_bad("stdout", &log);
    let ctl = Controller::builder(nine_writes_with_error_at_450ms(ErrorPolicy::Halt))
        .with_stream(out.clone())
        .build();
    ctl.hook_all().unwrap();
    let mut rx = ctl.subscribe();

    out.write("1");
    out.write("bad");
    out.write("3");
    out.write("4");
    let events = collect_until(&mut rx, EventKind::Drained).await;

    assert_eq!(payloads(&log), ["1"]);
    assert_eq!(count(&events, EventKind::WriteSettled), 1);
    assert_eq!(count(&events, EventKind::WriteFailed), 3);
    assert_eq!(count(&events, EventKind::Unhooked), 1);
    assert!(!out.is_hooked());
    assert_eq!(ctl.errors().len(), 3);
}
