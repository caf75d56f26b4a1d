//! Indoor air-quality heuristic
//!
//! Gas resistance rises as volatile compounds disappear from the air, so the
//! score rewards a high baseline resistance. Humidity contributes the
//! remaining quarter: 25 points inside the 38-42 % comfort band, ramping down
//! outside it.
//!
//! The baseline is a cumulative mean over every sample since start-up, with
//! the reference resistance counted as the first sample. It is never reset.

use crate::constants::air_quality::{
    GAS_LOWER_LIMIT_OHM, GAS_REFERENCE_OHM, GAS_SCORE_MAX, GAS_UPPER_LIMIT_OHM,
    HUMIDITY_BAND_HIGH_PCT, HUMIDITY_BAND_LOW_PCT, HUMIDITY_HIGH_RAMP_OFFSET,
    HUMIDITY_REFERENCE_PCT, HUMIDITY_SCORE_MAX, INDEX_MAX, INDEX_SCALE,
};

/// Air-quality band of an index value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AirQualityLevel {
    Excellent,
    Good,
    LightlyPolluted,
    ModeratelyPolluted,
    HeavilyPolluted,
    SeverelyPolluted,
    ExtremelyPolluted,
}

/// Index value as computed, 0 is best
///
/// The raw value is not bounded. Use [`clamped`](Self::clamped) for anything
/// shown to people.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AirQualityIndex(f32);

impl AirQualityIndex {
    pub fn new(raw: f32) -> Self {
        Self(raw)
    }

    /// Unbounded formula output
    pub fn raw(self) -> f32 {
        self.0
    }

    /// Value limited to 0..=500
    pub fn clamped(self) -> f32 {
        self.0.clamp(0.0, INDEX_MAX)
    }

    pub fn level(self) -> AirQualityLevel {
        match self.clamped() {
            x if x <= 50.0 => AirQualityLevel::Excellent,
            x if x <= 100.0 => AirQualityLevel::Good,
            x if x <= 150.0 => AirQualityLevel::LightlyPolluted,
            x if x <= 200.0 => AirQualityLevel::ModeratelyPolluted,
            x if x <= 250.0 => AirQualityLevel::HeavilyPolluted,
            x if x <= 350.0 => AirQualityLevel::SeverelyPolluted,
            _ => AirQualityLevel::ExtremelyPolluted,
        }
    }
}

/// Gas contribution, 0..=75
pub fn gas_score(baseline_ohm: f64) -> f64 {
    let slope = 0.75 / (GAS_UPPER_LIMIT_OHM - GAS_LOWER_LIMIT_OHM);
    ((slope * baseline_ohm - GAS_LOWER_LIMIT_OHM * slope) * 100.0).clamp(0.0, GAS_SCORE_MAX)
}

/// Humidity contribution, 25 inside the comfort band
pub fn humidity_score(humidity_pct: f64) -> f64 {
    if (HUMIDITY_BAND_LOW_PCT..=HUMIDITY_BAND_HIGH_PCT).contains(&humidity_pct) {
        HUMIDITY_SCORE_MAX
    } else if humidity_pct < HUMIDITY_BAND_LOW_PCT {
        0.25 / HUMIDITY_REFERENCE_PCT * humidity_pct * 100.0
    } else {
        (-0.25 / (100.0 - HUMIDITY_REFERENCE_PCT) * humidity_pct + HUMIDITY_HIGH_RAMP_OFFSET)
            * 100.0
    }
}

/// Index for a gas baseline and the current humidity
pub fn index(baseline_ohm: f64, humidity_pct: f64) -> AirQualityIndex {
    let score = 100.0 - gas_score(baseline_ohm) - humidity_score(humidity_pct);
    AirQualityIndex((score * INDEX_SCALE) as f32)
}

/// Running gas baseline and the last index computed from it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirQualityState {
    baseline_ohm: f64,
    samples: u32,
    last_index: Option<AirQualityIndex>,
}

impl Default for AirQualityState {
    fn default() -> Self {
        Self::new()
    }
}

impl AirQualityState {
    pub fn new() -> Self {
        Self { baseline_ohm: GAS_REFERENCE_OHM, samples: 0, last_index: None }
    }

    /// Current baseline (Ω)
    pub fn baseline_ohm(&self) -> f64 {
        self.baseline_ohm
    }

    /// Gas samples folded into the baseline so far
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn last_index(&self) -> Option<AirQualityIndex> {
        self.last_index
    }

    /// Fold one gas resistance into the cumulative mean
    pub fn accumulate(&mut self, gas_resistance_ohm: u32) {
        self.samples = self.samples.saturating_add(1);
        let weight = f64::from(self.samples) + 1.0;
        self.baseline_ohm += (f64::from(gas_resistance_ohm) - self.baseline_ohm) / weight;
        debug!("gas baseline {} after {} samples", self.baseline_ohm, self.samples);
    }

    /// Score the current baseline against `humidity_pct` and remember it
    pub fn score(&mut self, humidity_pct: f64) -> AirQualityIndex {
        let value = index(self.baseline_ohm, humidity_pct);
        self.last_index = Some(value);
        value
    }
}
