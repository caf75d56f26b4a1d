//! Factory calibration
//!
//! The sensor stores its trimming coefficients in two register blocks
//! (0x89..0xA1 and 0xE1..0xF0) plus three heater trim registers. The blocks
//! are joined, the filler byte at 0x89 is dropped, and the remaining 38 bytes
//! are read as a fixed sequence of little-endian fields. Each coefficient
//! group then picks its fields by index.
//!
//! All coefficients are kept as `f64`. The compensation formulas run in
//! floating point and would otherwise convert on every call.

use crate::constants::registers::{
    COEFF_BLOCK_1, COEFF_BLOCK_1_LEN, COEFF_BLOCK_2, COEFF_BLOCK_2_LEN, RANGE_SW_ERR,
    RANGE_SW_ERR_MASK, RES_HEAT_RANGE, RES_HEAT_RANGE_MASK, RES_HEAT_VAL,
};
use crate::traits::RegisterBus;

/// Bytes left after joining both blocks and dropping the filler byte
pub const PACKED_LEN: usize = COEFF_BLOCK_1_LEN - 1 + COEFF_BLOCK_2_LEN - 2;

#[derive(Clone, Copy)]
enum Field {
    U8(usize),
    I8(usize),
    U16(usize),
    I16(usize),
}

/// Field sequence of the packed calibration bytes (byte offsets)
const LAYOUT: [Field; 27] = [
    Field::I16(0),  // 0: par_t2
    Field::I8(2),   // 1: par_t3
    Field::U8(3),   // 2: reserved
    Field::U16(4),  // 3: par_p1
    Field::I16(6),  // 4: par_p2
    Field::I8(8),   // 5: par_p3
    Field::U8(9),   // 6: reserved
    Field::I16(10), // 7: par_p4
    Field::I16(12), // 8: par_p5
    Field::I8(14),  // 9: par_p7
    Field::I8(15),  // 10: par_p6
    Field::U16(16), // 11: reserved
    Field::I16(18), // 12: par_p8
    Field::I16(20), // 13: par_p9
    Field::U8(22),  // 14: par_p10
    Field::U8(23),  // 15: reserved
    Field::U8(24),  // 16: par_h2 msb
    Field::U16(25), // 17: par_h1 msb << 8 | shared nibbles
    Field::I8(27),  // 18: par_h3
    Field::I8(28),  // 19: par_h4
    Field::I8(29),  // 20: par_h5
    Field::U8(30),  // 21: par_h6
    Field::I8(31),  // 22: par_h7
    Field::U16(32), // 23: par_t1
    Field::I16(34), // 24: par_g2
    Field::I8(36),  // 25: par_g1
    Field::I8(37),  // 26: par_g3
];

const TEMPERATURE: [usize; 3] = [23, 0, 1];
const PRESSURE: [usize; 10] = [3, 4, 5, 7, 8, 10, 9, 12, 13, 14];
const HUMIDITY_TAIL: [usize; 5] = [18, 19, 20, 21, 22];
const GAS: [usize; 3] = [25, 24, 26];

/// Decoded calibration of one device
///
/// Created once at bring-up and only handed out by shared reference
/// afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    /// `par_t1`, `par_t2`, `par_t3`
    pub temperature: [f64; 3],
    /// `par_p1` to `par_p10`
    pub pressure: [f64; 10],
    /// `par_h1` to `par_h7`
    pub humidity: [f64; 7],
    /// `par_g1`, `par_g2`, `par_g3`
    pub gas: [f64; 3],
    /// Heater range code (2 bits)
    pub heater_range: f64,
    /// Heater resistance trim (signed byte)
    pub heater_trim: f64,
    /// Gas range software error (signed 4 bits)
    pub range_sw_err: f64,
}

impl Calibration {
    /// Decode the raw register contents
    ///
    /// `block1` and `block2` are the bursts read from 0x89 and 0xE1. The
    /// remaining arguments are the raw bytes of registers 0x00, 0x02 and 0x04.
    pub fn from_registers(
        block1: &[u8; COEFF_BLOCK_1_LEN],
        block2: &[u8; COEFF_BLOCK_2_LEN],
        res_heat_val: u8,
        res_heat_range: u8,
        range_sw_err: u8,
    ) -> Self {
        let mut packed = [0u8; PACKED_LEN];
        let (head, tail) = packed.split_at_mut(COEFF_BLOCK_1_LEN - 1);
        head.copy_from_slice(&block1[1..]);
        tail.copy_from_slice(&block2[..PACKED_LEN - (COEFF_BLOCK_1_LEN - 1)]);

        let fields = LAYOUT.map(|field| decode_field(&packed, field));
        let pick = |index: usize| fields[index] as f64;

        // par_h1 and par_h2 share register 0xE2: low nibble to h1, high to h2.
        // Manufacturer layout; the older node firmware split this byte the other way.
        let h1_word = fields[17] as u16;
        let shared = (h1_word & 0x00FF) as u8;
        let h1 = ((h1_word >> 8) << 4) | (shared & 0x0F) as u16;
        let h2 = ((fields[16] as u16) << 4) | (shared >> 4) as u16;

        let mut humidity = [0.0; 7];
        humidity[0] = h1 as f64;
        humidity[1] = h2 as f64;
        for (slot, index) in humidity[2..].iter_mut().zip(HUMIDITY_TAIL) {
            *slot = pick(index);
        }

        Self {
            temperature: TEMPERATURE.map(pick),
            pressure: PRESSURE.map(pick),
            humidity,
            gas: GAS.map(pick),
            heater_range: ((res_heat_range & RES_HEAT_RANGE_MASK) >> 4) as f64,
            heater_trim: res_heat_val as i8 as f64,
            // Signed nibble, where the older node firmware read it unsigned.
            range_sw_err: (((range_sw_err & RANGE_SW_ERR_MASK) as i8) >> 4) as f64,
        }
    }

    /// Read and decode the calibration of the device on `bus`
    pub fn load<B: RegisterBus>(bus: &mut B) -> Result<Self, B::Error> {
        let mut block1 = [0u8; COEFF_BLOCK_1_LEN];
        let mut block2 = [0u8; COEFF_BLOCK_2_LEN];
        bus.read_register(COEFF_BLOCK_1, &mut block1)?;
        bus.read_register(COEFF_BLOCK_2, &mut block2)?;

        let res_heat_val = bus.read_byte(RES_HEAT_VAL)?;
        let res_heat_range = bus.read_byte(RES_HEAT_RANGE)?;
        let range_sw_err = bus.read_byte(RANGE_SW_ERR)?;

        let calibration =
            Self::from_registers(&block1, &block2, res_heat_val, res_heat_range, range_sw_err);
        debug!(
            "calibration loaded: t1={} p1={} h1={} g1={} heat_range={}",
            calibration.temperature[0],
            calibration.pressure[0],
            calibration.humidity[0],
            calibration.gas[0],
            calibration.heater_range
        );
        Ok(calibration)
    }
}

fn decode_field(bytes: &[u8; PACKED_LEN], field: Field) -> i32 {
    match field {
        Field::U8(at) => bytes[at] as i32,
        Field::I8(at) => bytes[at] as i8 as i32,
        Field::U16(at) => u16::from_le_bytes([bytes[at], bytes[at + 1]]) as i32,
        Field::I16(at) => i16::from_le_bytes([bytes[at], bytes[at + 1]]) as i32,
    }
}
