//! Time source.
//!
//! The scrobble protocol stamps every handshake with the current Unix time
//! and the server rejects clocks that drift too far (`BADTIME`), so the time
//! source is injectable rather than read from the system directly.

use chrono::{DateTime, Utc};

/// Wall-clock time source.
///
/// ```
/// use bridge_traits::{Clock, FixedClock};
///
/// let clock = FixedClock::at_unix(1_230_000_000);
/// assert_eq!(clock.unix_timestamp(), 1_230_000_000);
/// ```
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Whole seconds since the Unix epoch.
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// The host's system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Out-of-range values fall back to the epoch.
    pub fn at_unix(seconds: i64) -> Self {
        Self(DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
