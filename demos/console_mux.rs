//! # Demo: console_mux
//!
//! Multiplexes stdout and stderr through one paced chain.
//!
//! Shows how to:
//! - Hook the process standard streams with [`ControllerBuilder::with_stdio`].
//! - Use [`ErrorPolicy::Skip`] with a zero watchdog (every write "times out",
//!   yet every line is still printed, in order).
//! - Inject an out-of-band stream failure.
//! - Unhook everything when the queue drains.
//!
//! ## Flow
//! ```text
//! 18 lines, alternating stdout / stderr
//!     └─► Controller (interval 500ms, Skip, timeout 0)
//!           ├─► WriteFailed(Timeout) ×18   ─► LogWriter (tracing)
//!           ├─► StreamFailed at 4s          ─► recorded, chain keeps going
//!           └─► Drained                     ─► unhook_all(), print "drained"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example console_mux --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use decollide::{Config, Controller, ErrorPolicy, EventKind, LogWriter, Subscribe};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config {
        interval: Duration::from_millis(500),
        policy: ErrorPolicy::Skip,
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let ctl = Controller::builder(cfg)
        .with_stdio()
        .with_subscribers(subs)
        .build();
    ctl.hook_all()?;
    ctl.set_timeout(Duration::ZERO);

    let streams = ctl.streams();
    let (out, err) = (&streams[0], &streams[1]);
    let mut events = ctl.subscribe();

    for i in 1..=9 {
        out.write(format!("log:{i}\n"));
        err.write(format!("error:{i}\n"));
    }

    let reporter = err.reporter();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(4)).await;
        reporter.report("test error");
    });

    loop {
        let ev = events.recv().await?;
        if ev.kind != EventKind::Drained {
            continue;
        }
        ctl.unhook_all();
        out.write("drained\n");

        let history = ev.history.unwrap_or_else(|| Arc::from([]));
        let stream_errors = history.iter().filter(|r| r.error.is_stream_failure()).count();
        println!(
            "{} errors recorded ({} timeouts, {} stream failures)",
            history.len(),
            history.len() - stream_errors,
            stream_errors
        );
        return Ok(());
    }
}
