//! Time sources for the fleet.
//!
//! The fleet never reads the wall clock itself: every operation takes an
//! explicit `now`. The runner obtains `now` from a [`Clock`], which is
//! [`SystemClock`] in production and [`ManualClock`] in tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};

/// Errors from adjusting a [`ManualClock`].
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The adjusted time is outside the representable range.
    #[error("clock overflow: cannot move {current} by {delta}")]
    Overflow {
        /// The time before the adjustment.
        current: DateTime<Utc>,
        /// The requested adjustment.
        delta: TimeDelta,
    },
}

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Stores milliseconds since the Unix epoch so it can be shared across tasks
/// without a lock.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start` (sub-millisecond precision is dropped).
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Jump to `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::Release);
    }

    /// Move forward (or backward) by `delta` and return the new instant.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the result is unrepresentable.
    pub fn advance(&self, delta: TimeDelta) -> Result<DateTime<Utc>, ClockError> {
        let current = self.now();
        let next = current
            .checked_add_signed(delta)
            .ok_or(ClockError::Overflow { current, delta })?;
        self.set(next);
        Ok(next)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::Acquire);
        DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
