//! Decides when the cached scores have to be downloaded again.
//!
//! The age of the snapshot is compared to the update interval: the snapshot
//! is stale once `now - last_updated >= interval`. Calendar days play no role,
//! a snapshot refreshed at 23:59 is still fresh at 00:01 with the default
//! interval.

use chrono::{DateTime, Duration, Utc};

/// The interval, in hours, used when none or an invalid one is configured.
pub const DEFAULT_UPDATE_INTERVAL_HOURS: i64 = 24;

/// The staleness policy of a [`crate::scores::Client`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StalenessPolicy {
    interval: Duration,
}

impl StalenessPolicy {
    /// Creates a new policy. A negative interval is replaced by
    /// [`DEFAULT_UPDATE_INTERVAL_HOURS`].
    pub fn new(interval: Duration) -> Self {
        let interval = if interval < Duration::zero() {
            Duration::hours(DEFAULT_UPDATE_INTERVAL_HOURS)
        } else {
            interval
        };
        StalenessPolicy { interval }
    }

    /// The normalized interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a snapshot last updated at `last_updated` is stale at `now`.
    ///
    /// A snapshot never refreshed is always stale. So is a snapshot dated in
    /// the future, which happens when the wall clock goes backwards.
    pub fn is_stale(&self, last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last_updated) = last_updated else {
            return true;
        };
        let elapsed = now - last_updated;
        elapsed < Duration::zero() || elapsed >= self.interval
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_UPDATE_INTERVAL_HOURS))
    }
}
