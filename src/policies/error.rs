//! # Error policy for latched stream failures.
//!
//! [`ErrorPolicy`] decides what a latched stream error does to the writes that
//! are still queued. It never suppresses the error events themselves.
//!
//! ```text
//! ErrorPolicy::Halt → every queued write after the latch fails immediately,
//!                     the failing stream is unhooked
//! ErrorPolicy::Skip → the error is recorded against the next write that
//!                     observes it; all writes still go out
//! ```

/// What a latched stream error does to the pacing chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort all subsequent writes (default).
    #[default]
    Halt,
    /// Record the error and keep writing.
    Skip,
}

impl ErrorPolicy {
    /// Maps the classic `skip` flag onto a policy.
    ///
    /// # Example
    /// ```
    /// use decollide::ErrorPolicy;
    ///
    /// assert_eq!(ErrorPolicy::from_skip(true), ErrorPolicy::Skip);
    /// assert_eq!(ErrorPolicy::from_skip(false), ErrorPolicy::Halt);
    /// ```
    #[inline]
    pub fn from_skip(skip: bool) -> Self {
        if skip { ErrorPolicy::Skip } else { ErrorPolicy::Halt }
    }

    /// True if latched errors are skipped rather than halting the chain.
    #[inline]
    pub fn skips(self) -> bool {
        matches!(self, ErrorPolicy::Skip)
    }
}
