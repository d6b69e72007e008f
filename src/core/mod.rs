//! Runtime core: queue state, pacing, hooks and the controller.
//!
//! The only public API from this module is [`Controller`] (with its
//! [`ControllerBuilder`] and [`Config`]) and the [`ErrorRecord`] it reports.
//!
//! Internal modules:
//! - [`queue`]: mirrored pending queue, error history and latch;
//! - [`pacer`]: the single consumer task that runs writes one at a time;
//! - [`watchdog`]: one write attempt raced against its deadline;
//! - [`hook`]: the write path and error listener installed into streams;
//! - [`controller`]: owns all of the above and the registered streams.

mod builder;
mod config;
mod controller;
mod hook;
mod pacer;
mod queue;
mod watchdog;

pub use builder::ControllerBuilder;
pub use config::Config;
pub use controller::Controller;
pub use queue::ErrorRecord;

pub(crate) use hook::{HookLink, OwnerId};
