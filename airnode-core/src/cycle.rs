//! Forced-mode measurement cycle
//!
//! ```text
//! Idle -> Configuring -> Triggered -> Polling -> Ready
//!                                        |
//!                                        +-----> TimedOut
//! ```
//!
//! A cycle that times out leaves the device in forced mode. It falls back
//! to sleep on its own once the conversion finishes.

use embedded_hal::delay::DelayNs;

use crate::constants::registers::{
    CONFIG, CTRL_GAS_1, CTRL_HUM, CTRL_MEAS, MEAS_BLOCK_LEN, MEAS_STATUS_0, MODE_FORCED, MODE_MASK,
};
use crate::constants::time::PRE_CONFIGURE_DELAY_MS;
use crate::errors::{SensorError, SensorResult};
use crate::raw::{is_ready, MeasurementBlock};
use crate::settings::{PollPolicy, SensorConfig};
use crate::traits::RegisterBus;
use crate::variant::VariantProfile;

/// Position in the measurement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    #[default]
    Idle,
    Configuring,
    Triggered,
    Polling,
    Ready,
    TimedOut,
}

/// Drives one forced conversion at a time
#[derive(Debug, Default)]
pub struct MeasurementCycle {
    state: CycleState,
}

impl MeasurementCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Configure, trigger and poll until the block is ready
    ///
    /// A bus error aborts the cycle and puts it back to `Idle`.
    pub fn run<B, D>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        config: &SensorConfig,
        profile: &VariantProfile,
    ) -> SensorResult<MeasurementBlock, B::Error>
    where
        B: RegisterBus,
        D: DelayNs,
    {
        let result = self.configure(bus, delay, config, profile)
            .and_then(|()| self.trigger(bus))
            .and_then(|()| self.poll(bus, delay, &config.poll));

        if matches!(result, Err(SensorError::Bus(_))) {
            self.transition(CycleState::Idle);
        }
        result
    }

    fn configure<B: RegisterBus, D: DelayNs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        config: &SensorConfig,
        profile: &VariantProfile,
    ) -> SensorResult<(), B::Error> {
        self.transition(CycleState::Configuring);
        delay.delay_ms(PRE_CONFIGURE_DELAY_MS);

        bus.write_register(CONFIG, &[config.config_register()]).map_err(SensorError::Bus)?;
        bus.write_register(CTRL_HUM, &[config.ctrl_hum()]).map_err(SensorError::Bus)?;
        bus.write_register(CTRL_MEAS, &[config.ctrl_meas()]).map_err(SensorError::Bus)?;
        bus.write_register(CTRL_GAS_1, &[profile.ctrl_gas()]).map_err(SensorError::Bus)?;
        Ok(())
    }

    fn trigger<B: RegisterBus>(&mut self, bus: &mut B) -> SensorResult<(), B::Error> {
        let ctrl_meas = bus.read_byte(CTRL_MEAS).map_err(SensorError::Bus)?;
        bus.write_register(CTRL_MEAS, &[(ctrl_meas & !MODE_MASK) | MODE_FORCED])
            .map_err(SensorError::Bus)?;
        self.transition(CycleState::Triggered);
        Ok(())
    }

    fn poll<B: RegisterBus, D: DelayNs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        policy: &PollPolicy,
    ) -> SensorResult<MeasurementBlock, B::Error> {
        self.transition(CycleState::Polling);
        let interval = policy.interval_ms.max(1);
        let mut waited_ms: u32 = 0;

        loop {
            let mut block = [0u8; MEAS_BLOCK_LEN];
            bus.read_register(MEAS_STATUS_0, &mut block).map_err(SensorError::Bus)?;
            if is_ready(&block) {
                self.transition(CycleState::Ready);
                return Ok(block);
            }
            if waited_ms >= policy.max_wait_ms {
                self.transition(CycleState::TimedOut);
                warn!("no new data after {} ms, giving up", waited_ms);
                return Err(SensorError::Timeout { waited_ms });
            }
            delay.delay_ms(interval);
            waited_ms = waited_ms.saturating_add(interval);
        }
    }

    fn transition(&mut self, next: CycleState) {
        trace!("cycle {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
