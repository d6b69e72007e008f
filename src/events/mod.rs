//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by a controller, its stream hooks and
//! its pacer.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - `Bus`, each controller's broadcast sender (crate-private)
//!
//! ## Quick reference
//! - **Publishers**: `Controller` (hook/unhook), `HookLink` (queued writes,
//!   stream failures), `Pacer` (settled/failed writes, drain).
//! - **Consumers**: `Controller::subscribe()` receivers and the controller's
//!   subscriber listener (fans out to `SubscriberSet`).

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
