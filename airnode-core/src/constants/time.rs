//! Timing Constants
//!
//! Delays around reset, conversion polling and refresh limiting.

/// Wait after the soft-reset command before the chip answers (ms).
///
/// Datasheet start-up time is 2 ms.
pub const SOFT_RESET_DELAY_MS: u32 = 10;

/// Settling delay before a measurement is configured (ms).
pub const PRE_CONFIGURE_DELAY_MS: u32 = 2;

/// Delay between two reads of the measurement status (ms).
pub const POLL_INTERVAL_MS: u32 = 5;

/// Default bound on the total time spent polling for new data (ms).
///
/// A forced conversion with full oversampling and a 150 ms heater phase
/// finishes well within 300 ms.
pub const DEFAULT_POLL_TIMEOUT_MS: u32 = 1000;

/// Shortest refresh interval the engine accepts (ms).
pub const MIN_REFRESH_INTERVAL_MS: u32 = 1000;

/// Extra spacing added to the refresh interval between burn-in and
/// air-quality samples (ms).
pub const SAMPLE_SPACING_MARGIN_MS: u32 = 2;

/// Longest heater duration the on-time register can encode (ms).
pub const MAX_HEATER_DURATION_MS: u16 = 0x0FC0;
