//! Acquisition and compensation engine for AirNode
//!
//! Talks to the combined pressure/temperature/humidity/gas sensor over paged
//! SPI, decodes its factory calibration, runs forced conversions and turns
//! raw ADC codes into physical units and an indoor air-quality index.
//!
//! Key constraints:
//! - `no_std`, no heap allocation
//! - Generic over any `embedded-hal` 1.0 SPI device and delay
//! - At most one bus cycle per refresh interval, however often it is asked
//!
//! ```no_run
//! use airnode_core::{EnvironmentSensor, PagedSpi, SensorConfig, MonotonicClock};
//! # fn run<SPI: embedded_hal::spi::SpiDevice, D: embedded_hal::delay::DelayNs>(spi: SPI, delay: D)
//! #     -> Result<(), airnode_core::SensorError<SPI::Error>> {
//!
//! let mut sensor = EnvironmentSensor::new(
//!     PagedSpi::new(spi),
//!     delay,
//!     MonotonicClock::new(),
//!     SensorConfig::default(),
//! )?;
//!
//! let reading = sensor.ensure_fresh_reading()?;
//! let aqi = sensor.indoor_air_quality()?;
//! println!("{:.1} °C, {:.0} hPa, AQI {:.0}", reading.temperature, reading.pressure, aqi.clamped());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod logging;

pub mod air_quality;
pub mod calibration;
pub mod compensation;
pub mod constants;
pub mod cycle;
pub mod errors;
pub mod limiter;
pub mod raw;
pub mod sensor;
pub mod settings;
pub mod time;
pub mod traits;
pub mod transport;
pub mod variant;

// Public API
pub use air_quality::{AirQualityIndex, AirQualityLevel, AirQualityState};
pub use calibration::Calibration;
pub use compensation::{FineTemperature, Reading};
pub use cycle::CycleState;
pub use errors::{InvalidReading, SensorError, SensorResult};
pub use sensor::EnvironmentSensor;
pub use settings::{HeaterProfile, IirFilter, Oversampling, PollPolicy, SensorConfig};
pub use time::{FixedTime, TimeSource, Timestamp};
pub use traits::RegisterBus;
pub use transport::PagedSpi;
pub use variant::ChipVariant;

#[cfg(feature = "std")]
pub use time::MonotonicClock;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
