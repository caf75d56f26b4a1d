//! Common test utilities for integration tests
//!
//! This module provides:
//! - A simulated sensor behind an `embedded-hal` SPI device, with its register
//!   file, SPI page bit and forced conversions
//! - A clock and a delay sharing one simulated time line
//! - Register images for calibration and ADC values
//! - A small deterministic random source

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use airnode_core::time::{TimeSource, Timestamp, FULL_WRAP_PERIOD};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

/// Coefficients written into the simulated calibration registers
#[derive(Debug, Clone)]
pub struct CalibrationImage {
    pub t1: u16,
    pub t2: i16,
    pub t3: i8,
    pub p1: u16,
    pub p2: i16,
    pub p3: i8,
    pub p4: i16,
    pub p5: i16,
    pub p6: i8,
    pub p7: i8,
    pub p8: i16,
    pub p9: i16,
    pub p10: u8,
    pub h1: u16,
    pub h2: u16,
    pub h3: i8,
    pub h4: i8,
    pub h5: i8,
    pub h6: u8,
    pub h7: i8,
    pub g1: i8,
    pub g2: i16,
    pub g3: i8,
    pub heater_range: u8,
    pub heater_trim: i8,
    pub range_sw_err: i8,
}

impl Default for CalibrationImage {
    fn default() -> Self {
        Self {
            t1: 27504,
            t2: 26435,
            t3: 3,
            p1: 36477,
            p2: -10685,
            p3: 88,
            p4: 7310,
            p5: -18,
            p6: 30,
            p7: 30,
            p8: -3,
            p9: -2523,
            p10: 30,
            h1: 683,
            h2: 1021,
            h3: 0,
            h4: 45,
            h5: 20,
            h6: 120,
            h7: -100,
            g1: -30,
            g2: -5700,
            g3: 18,
            heater_range: 1,
            heater_trim: 38,
            range_sw_err: 0,
        }
    }
}

impl CalibrationImage {
    /// Store the coefficients at their register addresses
    pub fn write_into(&self, regs: &mut [u8; 256]) {
        let mut put = |addr: u8, bytes: &[u8]| {
            let at = addr as usize;
            regs[at..at + bytes.len()].copy_from_slice(bytes);
        };
        put(0x8A, &self.t2.to_le_bytes());
        put(0x8C, &[self.t3 as u8]);
        put(0x8E, &self.p1.to_le_bytes());
        put(0x90, &self.p2.to_le_bytes());
        put(0x92, &[self.p3 as u8]);
        put(0x94, &self.p4.to_le_bytes());
        put(0x96, &self.p5.to_le_bytes());
        put(0x98, &[self.p7 as u8]);
        put(0x99, &[self.p6 as u8]);
        put(0x9C, &self.p8.to_le_bytes());
        put(0x9E, &self.p9.to_le_bytes());
        put(0xA0, &[self.p10]);

        put(0xE1, &[(self.h2 >> 4) as u8]);
        put(0xE2, &[(((self.h2 & 0x0F) << 4) | (self.h1 & 0x0F)) as u8]);
        put(0xE3, &[(self.h1 >> 4) as u8]);
        put(0xE4, &[self.h3 as u8, self.h4 as u8, self.h5 as u8, self.h6, self.h7 as u8]);
        put(0xE9, &self.t1.to_le_bytes());
        put(0xEB, &self.g2.to_le_bytes());
        put(0xED, &[self.g1 as u8, self.g3 as u8]);

        put(0x00, &[self.heater_trim as u8]);
        put(0x02, &[(self.heater_range & 0x03) << 4]);
        put(0x04, &[((self.range_sw_err as u8) & 0x0F) << 4]);
    }
}

/// ADC codes the simulated sensor reports after a conversion
#[derive(Debug, Clone, Copy)]
pub struct AdcImage {
    pub pressure: u32,
    pub temperature: u32,
    pub humidity: u16,
    pub gas: u16,
    pub gas_range: u8,
}

impl Default for AdcImage {
    fn default() -> Self {
        // ~25.16 °C, ~1000 hPa, ~40 %
        Self { pressure: 350000, temperature: 519888, humidity: 18850, gas: 512, gas_range: 0 }
    }
}

/// Register-level model of the sensor
pub struct SensorState {
    pub regs: [u8; 256],
    pub adc: AdcImage,
    /// Gas ADC codes consumed one per conversion before falling back to `adc.gas`
    pub gas_sequence: VecDeque<u16>,
    /// Status reads before a triggered conversion completes; `None` never completes
    pub latency_polls: Option<u32>,
    pending: Option<u32>,
    /// Conversions that complete; later ones never report new data
    pub stall_after: Option<u32>,
    pub conversions: u32,
    pub resets: u32,
    pub transactions: u32,
    read_pointer: Option<u8>,
}

impl SensorState {
    fn page_secondary(&self) -> bool {
        self.regs[0x73] & 0x10 != 0
    }

    fn resolve(&self, addr7: u8) -> u8 {
        let addr7 = addr7 & 0x7F;
        if addr7 == 0x73 || self.page_secondary() {
            addr7
        } else {
            addr7 | 0x80
        }
    }

    fn write(&mut self, addr: u8, value: u8) {
        match addr {
            0xE0 if value == 0xB6 => {
                self.resets += 1;
                self.regs[0x73] = 0;
                self.pending = None;
            }
            0x74 => {
                self.regs[0x74] = value;
                if value & 0x03 == 0x01 {
                    self.conversions += 1;
                    self.regs[0x1D] &= 0x7F;
                    self.pending = Some(self.latency_polls.unwrap_or(u32::MAX));
                }
            }
            _ => self.regs[addr as usize] = value,
        }
    }

    fn poll_status(&mut self) {
        let Some(remaining) = self.pending else { return };
        if self.latency_polls.is_none() {
            return;
        }
        if self.stall_after.is_some_and(|limit| self.conversions > limit) {
            return;
        }
        if remaining == 0 {
            self.complete_conversion();
        } else {
            self.pending = Some(remaining - 1);
        }
    }

    fn complete_conversion(&mut self) {
        self.pending = None;
        let gas = self.gas_sequence.pop_front().unwrap_or(self.adc.gas);
        // Both gas register pairs carry the conversion; the variant decides which is read.
        let block = measurement_block(&AdcImage { gas, ..self.adc });
        self.regs[0x1F..0x2E].copy_from_slice(&block[2..]);

        self.regs[0x74] &= 0xFC;
        self.regs[0x1D] |= 0x80;
    }
}

fn adc20(value: u32) -> [u8; 3] {
    [(value >> 12) as u8, (value >> 4) as u8, ((value & 0x0F) << 4) as u8]
}

/// 17-byte block as read from 0x1D after a completed conversion
pub fn measurement_block(adc: &AdcImage) -> [u8; 17] {
    let mut block = [0u8; 17];
    block[0] = 0x80;
    block[2..5].copy_from_slice(&adc20(adc.pressure));
    block[5..8].copy_from_slice(&adc20(adc.temperature));
    block[8..10].copy_from_slice(&adc.humidity.to_be_bytes());
    let gas_msb = (adc.gas >> 2) as u8;
    let gas_lsb = (((adc.gas & 0x03) as u8) << 6) | 0x30 | (adc.gas_range & 0x0F);
    block[13] = gas_msb;
    block[14] = gas_lsb;
    block[15] = gas_msb;
    block[16] = gas_lsb;
    block
}

/// Register file holding `calibration`, as the bring-up reads it
pub fn calibration_registers(calibration: &CalibrationImage) -> [u8; 256] {
    let mut regs = [0u8; 256];
    calibration.write_into(&mut regs);
    regs
}

/// Simulated sensor on an SPI bus; clones share the device
#[derive(Clone)]
pub struct SimulatedSensor {
    pub state: Rc<RefCell<SensorState>>,
}

impl SimulatedSensor {
    pub fn new(chip_id: u8, variant_id: u8, calibration: &CalibrationImage) -> Self {
        let mut regs = [0u8; 256];
        regs[0xD0] = chip_id;
        regs[0xF0] = variant_id;
        calibration.write_into(&mut regs);
        Self {
            state: Rc::new(RefCell::new(SensorState {
                regs,
                adc: AdcImage::default(),
                gas_sequence: VecDeque::new(),
                latency_polls: Some(2),
                pending: None,
                stall_after: None,
                conversions: 0,
                resets: 0,
                transactions: 0,
                read_pointer: None,
            })),
        }
    }

    /// Default device: right chip id, original gas part, typical calibration
    pub fn typical() -> Self {
        Self::new(0x61, 0x00, &CalibrationImage::default())
    }

    pub fn conversions(&self) -> u32 {
        self.state.borrow().conversions
    }

    pub fn register(&self, addr: u8) -> u8 {
        self.state.borrow().regs[addr as usize]
    }

    pub fn set_adc(&self, adc: AdcImage) {
        self.state.borrow_mut().adc = adc;
    }

    pub fn set_latency(&self, polls: Option<u32>) {
        self.state.borrow_mut().latency_polls = polls;
    }

    /// Let `conversions` more conversions complete, then stop reporting new data
    pub fn stall_after(&self, conversions: u32) {
        let mut state = self.state.borrow_mut();
        state.stall_after = Some(state.conversions + conversions);
    }

    pub fn queue_gas(&self, codes: impl IntoIterator<Item = u16>) {
        self.state.borrow_mut().gas_sequence.extend(codes);
    }
}

impl ErrorType for SimulatedSensor {
    type Error = Infallible;
}

impl SpiDevice for SimulatedSensor {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut state = self.state.borrow_mut();
        state.transactions += 1;
        state.read_pointer = None;

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if bytes.len() == 1 && bytes[0] & 0x80 != 0 {
                        let start = state.resolve(bytes[0]);
                        state.read_pointer = Some(start);
                    } else {
                        for pair in bytes.chunks_exact(2) {
                            let addr = state.resolve(pair[0]);
                            state.write(addr, pair[1]);
                        }
                    }
                }
                Operation::Read(buf) => {
                    let Some(start) = state.read_pointer else { continue };
                    if start == 0x1D {
                        state.poll_status();
                    }
                    for (offset, byte) in buf.iter_mut().enumerate() {
                        *byte = state.regs[start.wrapping_add(offset as u8) as usize];
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Clock reading the shared simulated time line
#[derive(Clone)]
pub struct SimClock {
    nanos: Rc<Cell<u64>>,
    period: u64,
}

impl SimClock {
    pub fn starting_at(ms: u64, period: u64) -> (Self, SimDelay) {
        let nanos = Rc::new(Cell::new(ms * 1_000_000));
        (Self { nanos: nanos.clone(), period }, SimDelay { nanos })
    }

    pub fn new() -> (Self, SimDelay) {
        Self::starting_at(0, FULL_WRAP_PERIOD)
    }

    pub fn advance_ms(&self, ms: u64) {
        self.nanos.set(self.nanos.get() + ms * 1_000_000);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.nanos.get() / 1_000_000
    }
}

impl TimeSource for SimClock {
    fn now(&self) -> Timestamp {
        (self.elapsed_ms() % self.period) as Timestamp
    }

    fn wrap_period(&self) -> u64 {
        self.period
    }
}

/// Delay that advances the shared time line instead of sleeping
#[derive(Clone)]
pub struct SimDelay {
    nanos: Rc<Cell<u64>>,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.nanos.set(self.nanos.get() + u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.nanos.set(self.nanos.get() + u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.nanos.set(self.nanos.get() + u64::from(ms) * 1_000_000);
    }
}

/// Linear congruential generator for reproducible sample streams
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Uniform in `low..high`
    pub fn range(&mut self, low: u16, high: u16) -> u16 {
        low + (self.next_u32() % u32::from(high - low)) as u16
    }
}

/// Sample variance
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0)
}
