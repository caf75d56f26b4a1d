//! Constants for AirNode Core
//!
//! Numeric values used by the engine, grouped by domain:
//! - **Registers**: register map, bit masks and SPI paging
//! - **Air quality**: scoring limits and references
//! - **Time**: reset, polling and refresh timing

/// Register map of the sensor.
pub mod registers;

/// Air-quality scoring parameters.
pub mod air_quality;

/// Time-related constants for reset, polling and refresh limiting.
pub mod time;

pub use registers::{EXPECTED_CHIP_ID, MEAS_BLOCK_LEN};

pub use air_quality::{GAS_LOWER_LIMIT_OHM, GAS_REFERENCE_OHM, GAS_UPPER_LIMIT_OHM, INDEX_MAX};

pub use time::{DEFAULT_POLL_TIMEOUT_MS, MIN_REFRESH_INTERVAL_MS, POLL_INTERVAL_MS};
