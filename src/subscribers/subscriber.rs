//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], an extension point for plugging custom event handlers into a controller.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Architecture
//! ```text
//! SubscriberSet ──► [bounded queue] ──► worker task ──► subscriber.on_event()
//!                                    └─► panic caught → tracing::error!
//! ```
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the event **for this subscriber only** and logs a
//!   warning; other subscribers are unaffected.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - [`Subscribe::accepts`] runs in the publisher's listener, before queueing.
//! - Subscribers do not block publishers or each other.
//!
//! ## Overflow behavior
//! 1) The new event is **dropped** for this subscriber only.
//! 2) A `tracing` warning names the subscriber.
//! 3) Other subscribers are unaffected.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use async_trait::async_trait;
//! use decollide::{Subscribe, Event, EventKind};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::WriteFailed) {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }     // prefer short, descriptive names
//!     fn queue_capacity(&self) -> usize { 2048 }        // larger buffer for bursty writers
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for controller observability.
///
/// Each subscriber runs in isolation:
/// - **Bounded queue** buffers events (capacity via [`Self::queue_capacity`]).
/// - **Dedicated worker task** processes events sequentially (FIFO).
/// - **Panic isolation**: panics are caught and logged.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    /// Events are delivered in FIFO order per subscriber.
    ///
    /// Panics are caught and logged; the worker keeps serving later events.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in overflow/panic diagnostics.
    ///
    /// Prefer short, descriptive names (e.g., "metrics", "audit", "console").
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// On overflow the new event is dropped for this subscriber only and a
    /// warning is logged. Capacity is clamped to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }

    /// Filters events before they are queued for this subscriber.
    ///
    /// Rejected events never take a queue slot. Chatty kinds such as
    /// `WriteQueued` can be dropped here. Default: accept everything.
    fn accepts(&self, _event: &Event) -> bool {
        true
    }
}
