//! Air-Quality Scoring Constants
//!
//! The heuristic index combines a gas-resistance contribution (up to 75
//! points) and a humidity contribution (up to 25 points). Both are subtracted
//! from 100 and scaled by 5, giving 0 (excellent) to 500 (hazardous).

/// Initial gas-resistance baseline before any sample (Ω).
pub const GAS_REFERENCE_OHM: f64 = 2500.0;

/// Gas resistance mapped to a gas score of 0 (Ω).
pub const GAS_LOWER_LIMIT_OHM: f64 = 2000.0;

/// Gas resistance at which the gas score saturates (Ω).
pub const GAS_UPPER_LIMIT_OHM: f64 = 50000.0;

/// Maximum gas contribution.
pub const GAS_SCORE_MAX: f64 = 75.0;

/// Ideal indoor relative humidity (%).
pub const HUMIDITY_REFERENCE_PCT: f64 = 40.0;

/// Lower edge of the ideal humidity band (%).
pub const HUMIDITY_BAND_LOW_PCT: f64 = 38.0;

/// Upper edge of the ideal humidity band (%).
pub const HUMIDITY_BAND_HIGH_PCT: f64 = 42.0;

/// Humidity contribution inside the ideal band.
pub const HUMIDITY_SCORE_MAX: f64 = 25.0;

/// Offset of the descending humidity ramp above the band.
pub const HUMIDITY_HIGH_RAMP_OFFSET: f64 = 0.416666;

/// Fresh gas samples averaged into the baseline per index computation.
pub const SAMPLES_PER_INDEX: usize = 5;

/// Scale from the 0-100 score to the 0-500 index.
pub const INDEX_SCALE: f64 = 5.0;

/// Largest index value shown to users.
pub const INDEX_MAX: f32 = 500.0;
