//! Refresh-rate limiting
//!
//! Callers may ask for a reading far more often than the sensor produces new
//! information (a display refresh and a metrics scrape within the same
//! second). The limiter decides whether a new bus cycle is due.

use crate::constants::time::MIN_REFRESH_INTERVAL_MS;
use crate::time::{ticks_diff, TimeSource, Timestamp};

/// Minimum spacing of measurement cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshLimiter {
    /// Minimum interval between cycles (ms)
    min_interval_ms: u32,
    /// Completion time of the last cycle
    last_cycle: Option<Timestamp>,
}

impl RefreshLimiter {
    /// Limiter with the given interval, raised to the hardware minimum
    pub fn new(min_interval_ms: u32) -> Self {
        Self { min_interval_ms: min_interval_ms.max(MIN_REFRESH_INTERVAL_MS), last_cycle: None }
    }

    pub fn min_interval_ms(&self) -> u32 {
        self.min_interval_ms
    }

    /// When the last cycle completed, if any
    pub fn last_cycle(&self) -> Option<Timestamp> {
        self.last_cycle
    }

    /// Whether a new cycle should run now
    pub fn is_due<T: TimeSource>(&self, clock: &T) -> bool {
        match self.last_cycle {
            None => true,
            Some(last) => {
                let elapsed = ticks_diff(last, clock.now(), clock.wrap_period());
                elapsed >= u64::from(self.min_interval_ms)
            }
        }
    }

    /// Record a completed cycle
    pub fn record(&mut self, at: Timestamp) {
        self.last_cycle = Some(at);
    }

    /// Forget the last cycle so the next check is due
    pub fn reset(&mut self) {
        self.last_cycle = None;
    }
}
