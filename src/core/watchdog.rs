//! # One physical write attempt under a deadline.
//!
//! - **Invoke the sink** once with a fresh [`Ack`]
//! - **Race** the acknowledgment against the watchdog deadline
//! - **Abandon** the loser: the real I/O is never cancelled, a late ack is a no-op
//!
//! ## Flow
//! ```text
//! sink.write(payload, ack)
//!        │
//!        ├─ deadline first   ─► Err(WriteError::Timeout { payload, .. })
//!        ├─ ack.done() first ─► Ok(payload)   (deadline timer dropped)
//!        └─ ack.fail() first ─► Err(WriteError::Stream { reason, .. })
//! ```
//!
//! ## Rules
//! - The deadline branch is polled first, so a zero timeout always times out
//! - `Completion::Synchronous` sinks are acknowledged when `write` returns,
//!   unless they failed the ack before returning
//! - A dropped [`Ack`] is treated as "never acknowledged"

use std::future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::error::WriteError;
use crate::sinks::{Ack, Completion, Payload, Stream};

/// Writes `payload` to the sink behind `stream`, failing after `timeout`.
///
/// `completion` is the mode captured when the stream was hooked.
pub(crate) async fn attempt(
    stream: &Stream,
    completion: Completion,
    payload: Payload,
    timeout: Duration,
) -> Result<Payload, WriteError> {
    let (ack, mut rx) = Ack::channel();
    stream.sink().write(payload.clone(), ack);

    let acknowledged = async move {
        match completion {
            Completion::Callback => match rx.await {
                Ok(res) => res,
                Err(_) => future::pending::<Result<(), Arc<str>>>().await,
            },
            Completion::Synchronous => rx.try_recv().unwrap_or(Ok(())),
        }
    };

    tokio::select! {
        biased;
        _ = time::sleep(timeout) => {
            tracing::debug!(stream = %stream.name(), ?timeout, %payload, "write timed out");
            Err(WriteError::Timeout {
                stream: stream.name_arc(),
                timeout,
                payload,
            })
        }
        acked = acknowledged => match acked {
            Ok(()) => Ok(payload),
            Err(reason) => {
                tracing::debug!(stream = %stream.name(), %reason, %payload, "write failed by sink");
                Err(WriteError::Stream {
                    stream: stream.name_arc(),
                    reason,
                })
            }
        },
    }
}
