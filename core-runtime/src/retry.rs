//! # Bounded Retry
//!
//! Counts consecutive failures of one class of operation and decides whether
//! another attempt is allowed.
//!
//! The policy is pure bookkeeping: it never sleeps, never issues requests and
//! never logs. Controllers call [`BoundedRetry::should_retry`] on every
//! recoverable failure and [`BoundedRetry::reset`] on the first success that
//! follows, so one instance covers one "operation class" (for example the
//! sequence of playlist fetches of a radio session).
//!
//! ```rust
//! use core_runtime::retry::BoundedRetry;
//!
//! let mut retry = BoundedRetry::new(2);
//! assert!(retry.should_retry());
//! assert!(retry.should_retry());
//! assert!(!retry.should_retry());
//!
//! retry.reset();
//! assert!(retry.should_retry());
//! ```

/// Ceiling used by the radio playlist fetcher unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Give-up-after-N policy for consecutive recoverable failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedRetry {
    failures: u32,
    max_retries: u32,
}

impl BoundedRetry {
    pub fn new(max_retries: u32) -> Self {
        Self {
            failures: 0,
            max_retries,
        }
    }

    /// Record a failure and report whether another attempt is permitted.
    ///
    /// Returns `true` while the number of consecutive failures is at most the
    /// ceiling; the call that pushes it past the ceiling returns `false`, as
    /// does every call after that until [`reset`](Self::reset).
    pub fn should_retry(&mut self) -> bool {
        self.failures = self.failures.saturating_add(1);
        self.failures <= self.max_retries
    }

    /// Forget all recorded failures.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures recorded since the last reset.
    pub fn attempts(&self) -> u32 {
        self.failures
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// True once a failure past the ceiling has been recorded.
    pub fn is_exhausted(&self) -> bool {
        self.failures > self.max_retries
    }
}

impl Default for BoundedRetry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}
