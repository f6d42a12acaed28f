//! Time source for cluster aging.
//!
//! Timestamps are seconds since the clock's own epoch. Only differences
//! between stamps from the same clock are meaningful.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A point in time, in seconds since the owning clock's epoch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Seconds elapsed from `self` to `now`.
    pub fn elapsed(&self, now: Timestamp) -> f64 {
        now.0 - self.0
    }

    /// Whether more than `lifetime_secs` have passed between `self` and `now`.
    pub fn is_expired(&self, now: Timestamp, lifetime_secs: f64) -> bool {
        self.elapsed(now) > lifetime_secs
    }
}

/// Something that can tell the time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-independent monotonic clock; epoch is the moment of construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.epoch.elapsed().as_secs_f64())
    }
}

/// A clock that only moves when told to. Used to replay recorded streams
/// and to drive expiry deterministically in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(secs: f64) -> Self {
        Self {
            now: Timestamp(secs),
        }
    }

    pub fn set(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn advance(&mut self, secs: f64) {
        self.now.0 += secs;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}
