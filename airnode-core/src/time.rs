//! Monotonic time for refresh limiting
//!
//! Microcontroller tick counters wrap. A millisecond counter in 32 bits wraps
//! after ~49.7 days, some runtimes wrap much earlier (2^30 ms). Every elapsed
//! time computation in the engine therefore goes through [`ticks_diff`], which
//! is correct across one wrap of the counter.

/// Timestamp in milliseconds on a monotonic, wrapping counter
pub type Timestamp = u32;

/// Wrap period of a full 32-bit millisecond counter
pub const FULL_WRAP_PERIOD: u64 = 1 << 32;

/// Source of monotonic time for the engine
///
/// Implementations must never go backwards except by wrapping at
/// [`wrap_period`](TimeSource::wrap_period).
pub trait TimeSource {
    /// Current counter value in milliseconds, always below `wrap_period()`
    fn now(&self) -> Timestamp;

    /// Counter modulus in milliseconds
    fn wrap_period(&self) -> u64 {
        FULL_WRAP_PERIOD
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn wrap_period(&self) -> u64 {
        (**self).wrap_period()
    }
}

/// Milliseconds elapsed from `earlier` to `later` on a counter wrapping at `period`
///
/// Valid as long as less than one full period separates the two stamps.
pub fn ticks_diff(earlier: Timestamp, later: Timestamp, period: u64) -> u64 {
    let period = period.max(1);
    let earlier = earlier as u64 % period;
    let later = later as u64 % period;
    (later + period - earlier) % period
}

/// Monotonic clock backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Clock counting from now
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as Timestamp
    }
}

/// Manually advanced time source
///
/// Useful for host-side replay and for tests that need to cross a wrap.
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: u64,
    period: u64,
}

impl FixedTime {
    /// Time source frozen at `timestamp` on a full 32-bit counter
    pub fn new(timestamp: Timestamp) -> Self {
        Self::with_period(timestamp, FULL_WRAP_PERIOD)
    }

    /// Time source frozen at `timestamp` on a counter wrapping at `period`
    pub fn with_period(timestamp: Timestamp, period: u64) -> Self {
        let period = period.max(1);
        Self { timestamp: timestamp as u64 % period, period }
    }

    /// Jump to an absolute counter value
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp as u64 % self.period;
    }

    /// Move forward, wrapping at the period
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = (self.timestamp + ms % self.period) % self.period;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp as Timestamp
    }

    fn wrap_period(&self) -> u64 {
        self.period
    }
}
