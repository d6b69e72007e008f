//! # Event subscribers for a controller.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and built-in implementations for handling events a controller broadcasts.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   HookLink / Pacer ── publish(Event) ──► Bus ──► subscriber listener
//!                                                        │
//!                                                        ▼
//!                                                  SubscriberSet::emit(&Event)
//!                                                        │
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                          LogWriter  Metrics   Custom ...
//! ```
//!
//! Subscribers are registered with
//! [`ControllerBuilder::with_subscribers`](crate::ControllerBuilder::with_subscribers).
//! For ad-hoc consumption, [`Controller::subscribe`](crate::Controller::subscribe)
//! returns a plain broadcast receiver instead.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
