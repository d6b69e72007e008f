//! Error types used by the decollide runtime.
//!
//! This module defines two error enums:
//!
//! - [`HookError`]: raised synchronously when a stream cannot be hooked.
//! - [`WriteError`]: raised asynchronously for a queued write (timeouts and
//!   out-of-band stream failures). Never returned from [`Stream::write`](crate::Stream::write);
//!   it is surfaced through [`Event`](crate::Event)s and the error history.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::sinks::Payload;

/// # Errors produced while hooking a stream.
///
/// A stream can be owned by at most one live [`Controller`](crate::Controller).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The stream already routes its writes through a controller.
    ///
    /// The existing hook is left untouched.
    #[error("stream `{stream}` is already hooked")]
    AlreadyHooked {
        /// Name of the stream.
        stream: Arc<str>,
    },
}

impl HookError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use decollide::HookError;
    ///
    /// let err = HookError::AlreadyHooked { stream: "stdout".into() };
    /// assert_eq!(err.as_label(), "hook_already_hooked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HookError::AlreadyHooked { .. } => "hook_already_hooked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HookError::AlreadyHooked { stream } => format!("already hooked: {stream}"),
        }
    }
}

/// # Errors produced by a queued write.
///
/// These are reported through the event bus and recorded in the error
/// history; the original `write` call has already returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// The sink did not acknowledge the write before the watchdog deadline.
    ///
    /// The underlying I/O is not cancelled; a late acknowledgment is ignored.
    #[error("write to `{stream}` timed out after {timeout:?}")]
    Timeout {
        /// Name of the stream the write targeted.
        stream: Arc<str>,
        /// The watchdog duration that was exceeded.
        timeout: Duration,
        /// The abandoned payload.
        payload: Payload,
    },

    /// The sink reported a failure out-of-band (e.g. a broken pipe).
    #[error("stream `{stream}` failed: {reason}")]
    Stream {
        /// Name of the stream that reported the failure.
        stream: Arc<str>,
        /// The reported reason.
        reason: Arc<str>,
    },
}

impl WriteError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use decollide::WriteError;
    ///
    /// let err = WriteError::Stream { stream: "stderr".into(), reason: "EPIPE".into() };
    /// assert_eq!(err.as_label(), "write_stream_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WriteError::Timeout { .. } => "write_timeout",
            WriteError::Stream { .. } => "write_stream_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WriteError::Timeout {
                stream,
                timeout,
                payload,
            } => format!("timeout: {timeout:?} stream={stream} payload={payload}"),
            WriteError::Stream { stream, reason } => format!("stream {stream}: {reason}"),
        }
    }

    /// Name of the stream this error belongs to.
    pub fn stream(&self) -> &str {
        match self {
            WriteError::Timeout { stream, .. } | WriteError::Stream { stream, .. } => stream,
        }
    }

    /// True for watchdog expirations.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WriteError::Timeout { .. })
    }

    /// True for out-of-band stream failures (the latched kind).
    ///
    /// # Example
    /// ```
    /// use decollide::WriteError;
    ///
    /// let err = WriteError::Stream { stream: "stdout".into(), reason: "closed".into() };
    /// assert!(err.is_stream_failure());
    /// assert!(!err.is_timeout());
    /// ```
    pub fn is_stream_failure(&self) -> bool {
        matches!(self, WriteError::Stream { .. })
    }
}
