//! The acquisition engine
//!
//! [`EnvironmentSensor`] owns the bus, a delay provider and a clock. Bus
//! traffic happens only in [`new`](EnvironmentSensor::new),
//! [`ensure_fresh_reading`](EnvironmentSensor::ensure_fresh_reading) and the
//! air-quality sampling built on top of it. Everything else reads state.
//!
//! The engine holds no lock. Callers on several tasks must serialize access
//! themselves.
//!
//! ```rust,ignore
//! let bus = PagedSpi::new(spi_device);
//! let mut sensor = EnvironmentSensor::new(bus, delay, MonotonicClock::new(), SensorConfig::default())?;
//! sensor.burn_in(300)?;
//!
//! let reading = sensor.ensure_fresh_reading()?;
//! let aqi = sensor.indoor_air_quality()?;
//! display.show(reading.temperature, reading.humidity, aqi.clamped());
//! ```

use embedded_hal::delay::DelayNs;

use crate::air_quality::{AirQualityIndex, AirQualityState};
use crate::calibration::Calibration;
use crate::compensation::{compensate, Offsets, Reading};
use crate::constants::air_quality::SAMPLES_PER_INDEX;
use crate::constants::registers::{
    CHIP_ID, EXPECTED_CHIP_ID, GAS_WAIT_0, RES_HEAT_0, SOFT_RESET, SOFT_RESET_CMD, VARIANT_ID,
};
use crate::constants::time::{SAMPLE_SPACING_MARGIN_MS, SOFT_RESET_DELAY_MS};
use crate::cycle::{CycleState, MeasurementCycle};
use crate::errors::{SensorError, SensorResult};
use crate::limiter::RefreshLimiter;
use crate::raw::RawSample;
use crate::settings::SensorConfig;
use crate::time::TimeSource;
use crate::traits::RegisterBus;
use crate::variant::{ChipVariant, VariantProfile};

/// Combined temperature, pressure, humidity and gas sensor
pub struct EnvironmentSensor<B, D, T> {
    bus: B,
    delay: D,
    clock: T,
    config: SensorConfig,
    offsets: Offsets,
    calibration: Calibration,
    profile: VariantProfile,
    cycle: MeasurementCycle,
    limiter: RefreshLimiter,
    latest: Option<Reading>,
    air_quality: AirQualityState,
}

impl<B, D, T> EnvironmentSensor<B, D, T>
where
    B: RegisterBus,
    D: DelayNs,
    T: TimeSource,
{
    /// Reset and identify the device, load its calibration and program the
    /// heater
    ///
    /// # Errors
    ///
    /// [`SensorError::ChipIdMismatch`] when the device is not of the expected
    /// family. Bus errors are passed through.
    pub fn new(mut bus: B, mut delay: D, clock: T, config: SensorConfig) -> SensorResult<Self, B::Error> {
        bus.write_register(SOFT_RESET, &[SOFT_RESET_CMD]).map_err(SensorError::Bus)?;
        delay.delay_ms(SOFT_RESET_DELAY_MS);

        let chip_id = bus.read_byte(CHIP_ID).map_err(SensorError::Bus)?;
        if chip_id != EXPECTED_CHIP_ID {
            warn!("chip id {:#x} does not match {:#x}", chip_id, EXPECTED_CHIP_ID);
            return Err(SensorError::ChipIdMismatch { found: chip_id, expected: EXPECTED_CHIP_ID });
        }

        let variant = ChipVariant::from_id(bus.read_byte(VARIANT_ID).map_err(SensorError::Bus)?);
        info!("sensor found: chip id {:#x}, variant {:?}", chip_id, variant);

        let calibration = Calibration::load(&mut bus).map_err(SensorError::Bus)?;

        let res_heat = config.heater.resistance_code(&calibration);
        let gas_wait = config.heater.duration_code();
        bus.write_register(RES_HEAT_0, &[res_heat]).map_err(SensorError::Bus)?;
        bus.write_register(GAS_WAIT_0, &[gas_wait]).map_err(SensorError::Bus)?;
        debug!("heater profile 0: res_heat {:#x}, gas_wait {:#x}", res_heat, gas_wait);

        Ok(Self {
            bus,
            delay,
            clock,
            offsets: config.offsets(),
            limiter: RefreshLimiter::new(config.refresh_interval_ms),
            config,
            calibration,
            profile: variant.profile(),
            cycle: MeasurementCycle::new(),
            latest: None,
            air_quality: AirQualityState::new(),
        })
    }

    /// Return a reading no older than the refresh interval
    ///
    /// Within the interval the cached reading is returned without bus
    /// traffic. Otherwise one full measurement cycle runs. If compensation
    /// fails the cache is dropped, so the next call measures again.
    pub fn ensure_fresh_reading(&mut self) -> SensorResult<Reading, B::Error> {
        if let Some(reading) = self.latest {
            if !self.limiter.is_due(&self.clock) {
                trace!("reading from {} ms still fresh", reading.timestamp);
                return Ok(reading);
            }
        }

        let block = self.cycle.run(&mut self.bus, &mut self.delay, &self.config, &self.profile)?;
        let stamp = self.clock.now();
        self.limiter.record(stamp);

        let raw = RawSample::decode(&block, self.profile.gas_offset());
        match compensate(&self.calibration, &self.profile, &raw, &self.offsets, stamp) {
            Ok(reading) => {
                self.latest = Some(reading);
                Ok(reading)
            }
            Err(err) => {
                warn!("dropping measurement: {}", err.reason);
                self.latest = None;
                self.limiter.reset();
                Err(err.into())
            }
        }
    }

    /// Most recent successful reading, without bus traffic
    pub fn latest(&self) -> Option<&Reading> {
        self.latest.as_ref()
    }

    /// Take `samples` gas readings into the baseline to let the heater settle
    ///
    /// Every reading taken before a failure stays in the baseline.
    pub fn burn_in(&mut self, samples: u32) -> SensorResult<(), B::Error> {
        debug!("burn-in over {} samples", samples);
        for _ in 0..samples {
            let reading = self.sample_gas()?;
            self.air_quality.accumulate(reading.gas_resistance);
        }
        Ok(())
    }

    /// Fold fresh gas samples into the baseline and score it against the
    /// latest humidity
    ///
    /// The samples are folded in only once all of them were taken. On error
    /// the baseline is left as it was.
    pub fn indoor_air_quality(&mut self) -> SensorResult<AirQualityIndex, B::Error> {
        let mut gas = [0u32; SAMPLES_PER_INDEX];
        let mut humidity = 0.0;
        for slot in gas.iter_mut() {
            let reading = self.sample_gas()?;
            *slot = reading.gas_resistance;
            humidity = f64::from(reading.humidity);
        }

        for resistance in gas {
            self.air_quality.accumulate(resistance);
        }
        let index = self.air_quality.score(humidity);
        debug!(
            "air quality {} (baseline {} ohm, humidity {})",
            index.raw(),
            self.air_quality.baseline_ohm(),
            humidity
        );
        Ok(index)
    }

    fn sample_gas(&mut self) -> SensorResult<Reading, B::Error> {
        self.delay.delay_ms(self.limiter.min_interval_ms().saturating_add(SAMPLE_SPACING_MARGIN_MS));
        self.ensure_fresh_reading()
    }

    /// Minimum spacing of bus cycles in force, after the 1000 ms floor
    pub fn refresh_interval_ms(&self) -> u32 {
        self.limiter.min_interval_ms()
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn variant(&self) -> ChipVariant {
        self.profile.variant()
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn air_quality_state(&self) -> &AirQualityState {
        &self.air_quality
    }

    /// State the measurement cycle stopped in
    pub fn cycle_state(&self) -> CycleState {
        self.cycle.state()
    }

    /// Tear down the engine and hand back its resources
    pub fn release(self) -> (B, D, T) {
        (self.bus, self.delay, self.clock)
    }
}

impl<B, D, T> core::fmt::Debug for EnvironmentSensor<B, D, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnvironmentSensor")
            .field("variant", &self.profile.variant())
            .field("config", &self.config)
            .field("cycle", &self.cycle.state())
            .field("latest", &self.latest)
            .field("air_quality", &self.air_quality)
            .finish_non_exhaustive()
    }
}
