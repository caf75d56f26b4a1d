//! Error Types for the Acquisition Engine
//!
//! ## Design
//!
//! Errors are returned from every bus-touching call, so they stay small and
//! `Copy` whenever the wrapped bus error is:
//!
//! 1. **No heap allocation**: messages are `&'static str`.
//! 2. **Opaque bus faults**: whatever the transport reports is carried
//!    unchanged in [`SensorError::Bus`]. The engine never retries a single
//!    transaction.
//! 3. **Recoverable vs fatal**: only [`SensorError::ChipIdMismatch`] is fatal.
//!    A timeout or an invalid reading leaves calibration and the air-quality
//!    baseline untouched, so the caller can simply run the cycle again.
//!
//! ## Error Categories
//!
//! ### Bring-up
//! - `ChipIdMismatch`: the identification register does not hold the expected
//!   constant. Do not keep talking to an unidentified device.
//!
//! ### Measurement
//! - `Timeout`: the ready bit never appeared within the poll budget.
//! - `InvalidReading`: compensation is undefined for the loaded calibration
//!   (e.g. a zeroed pressure coefficient would divide by zero).
//!
//! ### Transport
//! - `Bus`: SPI fault, propagated as-is.
//!
//! ```rust
//! use airnode_core::SensorError;
//!
//! fn describe<E: core::fmt::Debug>(err: &SensorError<E>) -> &'static str {
//!     match err {
//!         SensorError::ChipIdMismatch { .. } => "halt: unidentified device",
//!         SensorError::Timeout { .. } => "retry after backoff",
//!         SensorError::InvalidReading { .. } => "show last known value",
//!         SensorError::Bus(_) => "check wiring",
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for engine operations
pub type SensorResult<T, E> = Result<T, SensorError<E>>;

/// Errors surfaced by the acquisition engine
///
/// `E` is the error type of the underlying [`RegisterBus`](crate::traits::RegisterBus).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError<E> {
    /// Transport-level failure, propagated unchanged
    #[error("bus transfer failed: {0:?}")]
    Bus(E),

    /// Identification register did not match the expected chip id
    #[error("unexpected chip id {found:#x}, expected {expected:#x}")]
    ChipIdMismatch {
        /// Value read from the identification register
        found: u8,
        /// Chip id this engine drives
        expected: u8,
    },

    /// The data-ready bit was not observed within the poll budget
    #[error("no new data after {waited_ms} ms of polling")]
    Timeout {
        /// Time spent polling before giving up
        waited_ms: u32,
    },

    /// Compensation is undefined for the current calibration or sample
    #[error("invalid reading: {reason}")]
    InvalidReading {
        /// What made the reading invalid
        reason: &'static str,
    },
}

/// Compensation could not produce a physical value
///
/// Returned by the pure functions in [`compensation`](crate::compensation);
/// converts into [`SensorError::InvalidReading`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid reading: {reason}")]
pub struct InvalidReading {
    /// What made the reading invalid
    pub reason: &'static str,
}

impl<E> From<InvalidReading> for SensorError<E> {
    fn from(err: InvalidReading) -> Self {
        SensorError::InvalidReading { reason: err.reason }
    }
}

impl<E> SensorError<E> {
    /// Whether re-running the measurement cycle may succeed
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SensorError::ChipIdMismatch { .. })
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for SensorError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Bus(e) =>
                defmt::write!(fmt, "Bus error: {}", e),
            Self::ChipIdMismatch { found, expected } =>
                defmt::write!(fmt, "Chip id {=u8:#x}, expected {=u8:#x}", *found, *expected),
            Self::Timeout { waited_ms } =>
                defmt::write!(fmt, "No data after {} ms", waited_ms),
            Self::InvalidReading { reason } =>
                defmt::write!(fmt, "Invalid reading: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InvalidReading {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Invalid reading: {}", self.reason)
    }
}
