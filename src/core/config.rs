//! # Controller configuration.
//!
//! Provides [`Config`], the settings for one [`Controller`](crate::Controller).
//!
//! ## Sentinel values
//! - `interval = 0s` → no pacing delay (writes still run strictly one at a time)
//! - `timeout = 0s` → every write attempt times out immediately
//!   (the sink is still invoked, its result is abandoned)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::policies::ErrorPolicy;

/// Configuration for a [`Controller`](crate::Controller).
///
/// ## Field semantics
/// - `interval`: minimum spacing between consecutive write attempts, shared by all hooked streams
/// - `timeout`: watchdog duration per write attempt (adjustable later via `Controller::set_timeout`)
/// - `policy`: what a latched stream error does to queued writes
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Minimum spacing between consecutive write attempts.
    pub interval: Duration,

    /// Per-attempt watchdog duration.
    ///
    /// A write not acknowledged within `timeout` fails with
    /// [`WriteError::Timeout`](crate::WriteError::Timeout).
    pub timeout: Duration,

    /// Halt or skip on latched stream errors.
    pub policy: ErrorPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// True if latched errors are recorded but do not halt the chain.
    #[inline]
    pub fn skip_errors(&self) -> bool {
        self.policy.skips()
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `interval = 100ms`
    /// - `timeout = 1s`
    /// - `policy = ErrorPolicy::Halt`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            timeout: Duration::from_millis(1000),
            policy: ErrorPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

/// Timing shared between a controller and its pacer.
///
/// The interval is fixed at build time; the timeout can be changed while
/// writes are in flight and applies from the next attempt.
#[derive(Debug)]
pub(crate) struct Settings {
    interval: Duration,
    timeout_us: AtomicU64,
}

impl Settings {
    pub(crate) fn new(cfg: &Config) -> Self {
        Self {
            interval: cfg.interval,
            timeout_us: AtomicU64::new(as_micros(cfg.timeout)),
        }
    }

    #[inline]
    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_micros(self.timeout_us.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn set_timeout(&self, timeout: Duration) {
        self.timeout_us.store(as_micros(timeout), Ordering::Relaxed);
    }
}

fn as_micros(d: Duration) -> u64 {
    d.as_micros().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_options() {
        let cfg = Config::default();
        assert_eq!(cfg.interval, Duration::from_millis(100));
        assert_eq!(cfg.timeout, Duration::from_secs(1));
        assert!(!cfg.skip_errors());
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn zero_bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn timeout_is_adjustable() {
        let s = Settings::new(&Config::default());
        assert_eq!(s.timeout(), Duration::from_secs(1));
        s.set_timeout(Duration::ZERO);
        assert_eq!(s.timeout(), Duration::ZERO);
        s.set_timeout(Duration::from_millis(250));
        assert_eq!(s.timeout(), Duration::from_millis(250));
        assert_eq!(s.interval(), Duration::from_millis(100));
    }
}
