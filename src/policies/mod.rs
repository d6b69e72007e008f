//! Write-failure policies.
//!
//! ## Contents
//! - [`ErrorPolicy`] whether a latched stream error halts the pacing chain
//!   or is only recorded
//!
//! ## Quick wiring
//! ```text
//! Config { policy: ErrorPolicy, .. }
//!      └─► core::queue::QueueState::should_abort() consults it before and
//!          after every pacing delay
//! ```
//!
//! ## Defaults
//! - `ErrorPolicy::Halt`.

mod error;

pub use error::ErrorPolicy;
