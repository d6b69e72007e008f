//! # Logging subscriber for debugging and demos.
//!
//! [`LogWriter`] renders controller events as `tracing` records. Failures go
//! out at `warn`, everything else at `info` (queued writes at `debug`).
//!
//! It never prints: the streams it would print to are usually the ones the
//! controller is pacing.
//!
//! ## Output format (with a plain `fmt` collector)
//! ```text
//! INFO  [hooked] stream=stdout
//! INFO  [settled] stream=stdout payload=Some("tick 1") depth=Some(3)
//! WARN  [failed] stream=stderr payload=Some("tick 2") err=Some("timeout: 0ns stream=stderr payload=tick 2")
//! WARN  [stream-failed] stream=stdout err=Some("stream stdout: broken pipe") depth=Some(2)
//! INFO  [drained] last=Some("tick 9") errors=1
//! INFO  [unhooked] stream=stdout
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// `tracing`-backed logging subscriber.
///
/// Enabled via the `logging` feature. Install a `tracing` collector (for
/// example `tracing-subscriber`) to see the output.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let stream = e.stream.as_deref().unwrap_or("-");
        let payload = e.payload.as_ref().map(|p| p.to_string_lossy().into_owned());
        let err = e.error.as_ref().map(|err| err.as_message());

        match e.kind {
            EventKind::Hooked => tracing::info!("[hooked] stream={stream}"),
            EventKind::Unhooked => match err {
                Some(err) => tracing::warn!("[unhooked] stream={stream} err={err:?}"),
                None => tracing::info!("[unhooked] stream={stream}"),
            },
            EventKind::WriteQueued => {
                tracing::debug!("[queued] stream={stream} payload={payload:?} depth={:?}", e.depth);
            }
            EventKind::WriteSettled => {
                tracing::info!("[settled] stream={stream} payload={payload:?} depth={:?}", e.depth);
            }
            EventKind::WriteFailed => {
                tracing::warn!("[failed] stream={stream} payload={payload:?} err={err:?}");
            }
            EventKind::StreamFailed => {
                tracing::warn!("[stream-failed] stream={stream} err={err:?} depth={:?}", e.depth);
            }
            EventKind::Drained => {
                let errors = e.history.as_ref().map_or(0, |h| h.len());
                tracing::info!("[drained] last={payload:?} errors={errors}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
