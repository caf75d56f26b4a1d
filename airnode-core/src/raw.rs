//! Raw field decoding of the measurement block
//!
//! Layout of the 17 bytes read from 0x1D:
//!
//! | Byte    | Content                                           |
//! |---------|---------------------------------------------------|
//! | 0       | status, bit 7 = new data                          |
//! | 2..=4   | pressure ADC, 20 bit, low nibble of byte 4 unused |
//! | 5..=7   | temperature ADC, same packing                     |
//! | 8..=9   | humidity ADC, big-endian                          |
//! | 13..=14 | gas ADC and range, original part                  |
//! | 15..=16 | gas ADC and range, high-range part                |
//!
//! The gas ADC is the top 10 bits of its big-endian pair. The byte after the
//! MSB also carries the range index (bits 3:0), heater stability (bit 4) and
//! gas validity (bit 5).

use crate::constants::registers::{MEAS_BLOCK_LEN, NEW_DATA};

const GAS_VALID: u8 = 0x20;
const HEAT_STABLE: u8 = 0x10;
const GAS_RANGE_MASK: u8 = 0x0F;

/// One measurement block
pub type MeasurementBlock = [u8; MEAS_BLOCK_LEN];

/// ADC codes and status flags of one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub pressure_adc: u32,
    pub temperature_adc: u32,
    pub humidity_adc: u16,
    pub gas_adc: u16,
    pub gas_range: u8,
    pub new_data: bool,
    pub gas_valid: bool,
    pub heat_stable: bool,
}

impl RawSample {
    /// Decode a measurement block; `gas_offset` is the position of the gas
    /// ADC MSB for the device variant
    pub fn decode(block: &MeasurementBlock, gas_offset: usize) -> Self {
        let gas_lsb = block[gas_offset + 1];
        Self {
            pressure_adc: adc20(block[2], block[3], block[4]),
            temperature_adc: adc20(block[5], block[6], block[7]),
            humidity_adc: u16::from_be_bytes([block[8], block[9]]),
            gas_adc: u16::from_be_bytes([block[gas_offset], gas_lsb]) >> 6,
            gas_range: gas_lsb & GAS_RANGE_MASK,
            new_data: is_ready(block),
            gas_valid: gas_lsb & GAS_VALID != 0,
            heat_stable: gas_lsb & HEAT_STABLE != 0,
        }
    }
}

/// Whether the conversion behind `block` has completed
pub fn is_ready(block: &MeasurementBlock) -> bool {
    block[0] & NEW_DATA != 0
}

fn adc20(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    (u32::from(msb) << 12) | (u32::from(lsb) << 4) | (u32::from(xlsb) >> 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> MeasurementBlock {
        let mut block = [0u8; MEAS_BLOCK_LEN];
        block[0] = 0x80;
        block[2..5].copy_from_slice(&[0x5A, 0x3C, 0x9F]);
        block[5..8].copy_from_slice(&[0x7E, 0xED, 0x00]);
        block[8..10].copy_from_slice(&[0x6B, 0x21]);
        block[13..15].copy_from_slice(&[0x64, 0x35]);
        block[15..17].copy_from_slice(&[0x81, 0xE7]);
        block
    }

    #[test]
    fn pressure_and_temperature_drop_low_nibble() {
        let raw = RawSample::decode(&block(), 13);
        assert_eq!(raw.pressure_adc, 0x5A3C9);
        assert_eq!(raw.temperature_adc, 519888);
        assert_eq!(raw.humidity_adc, 0x6B21);
        assert!(raw.new_data);
    }

    #[test]
    fn gas_fields_of_the_original_part() {
        let raw = RawSample::decode(&block(), 13);
        // 0x6435 >> 6 = 400, range 5, valid, stable
        assert_eq!(raw.gas_adc, 400);
        assert_eq!(raw.gas_range, 5);
        assert!(raw.gas_valid);
        assert!(raw.heat_stable);
    }

    #[test]
    fn gas_fields_of_the_high_range_part() {
        let raw = RawSample::decode(&block(), 15);
        // 0x81E7 >> 6 = 519, range 7, valid, not stable
        assert_eq!(raw.gas_adc, 519);
        assert_eq!(raw.gas_range, 7);
        assert!(raw.gas_valid);
        assert!(!raw.heat_stable);
    }

    #[test]
    fn ready_bit() {
        let mut block = block();
        assert!(is_ready(&block));
        block[0] = 0x00;
        assert!(!is_ready(&block));
    }
}
