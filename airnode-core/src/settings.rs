//! Measurement settings
//!
//! [`SensorConfig`] collects everything the engine writes to the device or
//! applies to its readings. The defaults reproduce the settings the node has
//! always shipped with: temperature x8, pressure x4, humidity x2, IIR filter
//! size 7 and a 320 °C / 148 ms heater step.
//!
//! ```rust
//! use airnode_core::settings::{IirFilter, Oversampling, SensorConfig};
//!
//! let config = SensorConfig::builder()
//!     .pressure_oversampling(Oversampling::X16)
//!     .filter(IirFilter::C3)
//!     .temperature_offset_c(-1.5)
//!     .refresh_interval_ms(5_000)
//!     .build();
//!
//! assert_eq!(config.ctrl_meas(), 0b100_101_00);
//! ```

use crate::calibration::Calibration;
use crate::compensation::{temperature_offset_ticks, Offsets};
use crate::constants::time::{
    DEFAULT_POLL_TIMEOUT_MS, MAX_HEATER_DURATION_MS, MIN_REFRESH_INTERVAL_MS, POLL_INTERVAL_MS,
};

/// Hardware oversampling of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// Channel not measured
    Skipped = 0,
    #[default]
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

/// IIR filter size for temperature and pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IirFilter {
    #[default]
    Off = 0,
    C1 = 1,
    C3 = 2,
    C7 = 3,
    C15 = 4,
    C31 = 5,
    C63 = 6,
    C127 = 7,
}

/// Gas heater step programmed into profile slot 0
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeaterProfile {
    /// Hot plate target (°C)
    pub target_c: u16,
    /// Time the plate is held at target before the gas conversion (ms)
    pub duration_ms: u16,
    /// Ambient temperature estimate used to size the heater current (°C)
    pub ambient_c: f32,
}

impl Default for HeaterProfile {
    fn default() -> Self {
        Self { target_c: 320, duration_ms: 148, ambient_c: 25.0 }
    }
}

impl HeaterProfile {
    /// `res_heat_0` register value for this target on the given device
    pub fn resistance_code(&self, calibration: &Calibration) -> u8 {
        let [g1, g2, g3] = calibration.gas;
        let target = f64::from(self.target_c.min(400));
        let ambient = f64::from(self.ambient_c);

        let var1 = g1 / 16.0 + 49.0;
        let var2 = g2 / 32768.0 * 0.0005 + 0.00235;
        let var3 = g3 / 1024.0;
        let var4 = var1 * (1.0 + var2 * target);
        let var5 = var4 + var3 * ambient;
        let res_heat = 3.4
            * (var5
                * (4.0 / (4.0 + calibration.heater_range))
                * (1.0 / (1.0 + calibration.heater_trim * 0.002))
                - 25.0);

        res_heat.clamp(0.0, u8::MAX as f64) as u8
    }

    /// `gas_wait_0` register value: 6-bit mantissa and a x1/x4/x16/x64
    /// multiplier in the top two bits
    pub fn duration_code(&self) -> u8 {
        if self.duration_ms >= MAX_HEATER_DURATION_MS {
            return 0xFF;
        }
        let mut duration = self.duration_ms;
        let mut factor: u8 = 0;
        while duration > 0x3F {
            duration /= 4;
            factor += 1;
        }
        duration as u8 + factor * 64
    }
}

/// Bounds of the data-ready poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PollPolicy {
    /// Delay between two status reads (ms)
    pub interval_ms: u32,
    /// Total delay after which the cycle gives up (ms)
    pub max_wait_ms: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval_ms: POLL_INTERVAL_MS, max_wait_ms: DEFAULT_POLL_TIMEOUT_MS }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    pub temperature_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    pub humidity_oversampling: Oversampling,
    pub filter: IirFilter,
    pub heater: HeaterProfile,
    pub poll: PollPolicy,
    /// Minimum time between two bus cycles (ms). Values below 1000 ms are
    /// raised to 1000 ms.
    pub refresh_interval_ms: u32,
    /// Offset applied to t_fine, so it also shifts pressure and humidity (°C)
    pub fine_temperature_offset_c: f32,
    /// Offset added to the reported temperature only (°C)
    pub temperature_offset_c: f32,
    /// Offset added to the clamped relative humidity (%)
    pub humidity_offset_pct: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            temperature_oversampling: Oversampling::X8,
            pressure_oversampling: Oversampling::X4,
            humidity_oversampling: Oversampling::X2,
            filter: IirFilter::C7,
            heater: HeaterProfile::default(),
            poll: PollPolicy::default(),
            refresh_interval_ms: MIN_REFRESH_INTERVAL_MS,
            fine_temperature_offset_c: 0.0,
            temperature_offset_c: 0.0,
            humidity_offset_pct: 0.0,
        }
    }
}

impl SensorConfig {
    pub fn builder() -> SensorConfigBuilder {
        SensorConfigBuilder::default()
    }

    /// `config` register value
    pub fn config_register(&self) -> u8 {
        (self.filter as u8) << 2
    }

    /// `ctrl_hum` register value
    pub fn ctrl_hum(&self) -> u8 {
        self.humidity_oversampling as u8
    }

    /// `ctrl_meas` register value in sleep mode
    pub fn ctrl_meas(&self) -> u8 {
        ((self.temperature_oversampling as u8) << 5) | ((self.pressure_oversampling as u8) << 2)
    }

    /// Offsets in the form the compensation pipeline consumes
    pub fn offsets(&self) -> Offsets {
        Offsets {
            fine_ticks: temperature_offset_ticks(self.fine_temperature_offset_c),
            temperature_c: f64::from(self.temperature_offset_c),
            humidity_pct: f64::from(self.humidity_offset_pct),
        }
    }
}

/// Consuming builder for [`SensorConfig`]
#[derive(Debug, Default, Clone)]
pub struct SensorConfigBuilder {
    config: SensorConfig,
}

impl SensorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature_oversampling(mut self, os: Oversampling) -> Self {
        self.config.temperature_oversampling = os;
        self
    }

    pub fn pressure_oversampling(mut self, os: Oversampling) -> Self {
        self.config.pressure_oversampling = os;
        self
    }

    pub fn humidity_oversampling(mut self, os: Oversampling) -> Self {
        self.config.humidity_oversampling = os;
        self
    }

    pub fn filter(mut self, filter: IirFilter) -> Self {
        self.config.filter = filter;
        self
    }

    pub fn heater(mut self, heater: HeaterProfile) -> Self {
        self.config.heater = heater;
        self
    }

    pub fn poll(mut self, poll: PollPolicy) -> Self {
        self.config.poll = poll;
        self
    }

    /// Minimum spacing of bus cycles; the engine raises it to 1000 ms if lower
    pub fn refresh_interval_ms(mut self, interval_ms: u32) -> Self {
        self.config.refresh_interval_ms = interval_ms;
        self
    }

    pub fn fine_temperature_offset_c(mut self, offset: f32) -> Self {
        self.config.fine_temperature_offset_c = offset;
        self
    }

    pub fn temperature_offset_c(mut self, offset: f32) -> Self {
        self.config.temperature_offset_c = offset;
        self
    }

    pub fn humidity_offset_pct(mut self, offset: f32) -> Self {
        self.config.humidity_offset_pct = offset;
        self
    }

    pub fn build(self) -> SensorConfig {
        self.config
    }
}
