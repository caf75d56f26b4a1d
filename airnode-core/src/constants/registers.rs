//! Register Map
//!
//! Logical 8-bit register addresses of the sensor. On SPI the device exposes
//! only 7 address bits, so registers below [`PAGE_BOUNDARY`] live in the
//! secondary memory page and the rest in the primary page. The transport
//! selects the page before each access.
//!
//! Source: manufacturer datasheet, memory map and SPI interface sections.

// ===== IDENTIFICATION =====

/// Chip identification register.
pub const CHIP_ID: u8 = 0xD0;

/// Chip identification value of this sensor family.
///
/// Other sensors on the same bus (e.g. the 0x60 pressure/humidity-only part)
/// report different values.
pub const EXPECTED_CHIP_ID: u8 = 0x61;

/// Chip variant register.
///
/// 0x01 selects the high-range gas formula, every other value the
/// lookup-table formula.
pub const VARIANT_ID: u8 = 0xF0;

/// Variant id of the high-range gas sensing part.
pub const VARIANT_GAS_HIGH: u8 = 0x01;

// ===== CALIBRATION =====

/// First calibration block.
pub const COEFF_BLOCK_1: u8 = 0x89;

/// Length of the first calibration block (bytes).
pub const COEFF_BLOCK_1_LEN: usize = 25;

/// Second calibration block.
pub const COEFF_BLOCK_2: u8 = 0xE1;

/// Length of the second calibration block (bytes).
pub const COEFF_BLOCK_2_LEN: usize = 16;

/// Heater resistance trim.
pub const RES_HEAT_VAL: u8 = 0x00;

/// Heater range, bits 5:4.
pub const RES_HEAT_RANGE: u8 = 0x02;

/// Mask isolating the heater range field.
pub const RES_HEAT_RANGE_MASK: u8 = 0x30;

/// Software range error, bits 7:4.
pub const RANGE_SW_ERR: u8 = 0x04;

/// Mask isolating the software range error field.
pub const RANGE_SW_ERR_MASK: u8 = 0xF0;

// ===== HEATER PROFILE 0 =====

/// Heater resistance target for profile 0.
pub const RES_HEAT_0: u8 = 0x5A;

/// Heater on-time for profile 0.
pub const GAS_WAIT_0: u8 = 0x64;

// ===== CONTROL =====

/// Soft reset register.
pub const SOFT_RESET: u8 = 0xE0;

/// Command written to [`SOFT_RESET`].
pub const SOFT_RESET_CMD: u8 = 0xB6;

/// Gas control: `run_gas` and heater profile selection.
pub const CTRL_GAS_1: u8 = 0x71;

/// `run_gas` bit position on the lookup-table variant. The high-range
/// variant uses the next bit up.
pub const RUN_GAS: u8 = 0x10;

/// Humidity oversampling control.
pub const CTRL_HUM: u8 = 0x72;

/// Status register. Holds the SPI page bit and exists in both pages.
pub const STATUS: u8 = 0x73;

/// Temperature/pressure oversampling and power mode.
pub const CTRL_MEAS: u8 = 0x74;

/// IIR filter configuration.
pub const CONFIG: u8 = 0x75;

/// Power mode bits of [`CTRL_MEAS`].
pub const MODE_MASK: u8 = 0x03;

/// Forced (one-shot) power mode.
pub const MODE_FORCED: u8 = 0x01;

// ===== MEASUREMENT DATA =====

/// Measurement status followed by the field data.
pub const MEAS_STATUS_0: u8 = 0x1D;

/// Status byte plus 16 data bytes.
pub const MEAS_BLOCK_LEN: usize = 17;

/// `new_data_0` flag in the first byte of the measurement block.
pub const NEW_DATA: u8 = 0x80;

// ===== SPI PAGING =====

/// Registers below this address are in the secondary page.
pub const PAGE_BOUNDARY: u8 = 0x80;

/// Page bit value selecting the secondary page (registers 0x00-0x7F).
pub const PAGE_SECONDARY: u8 = 0x10;

/// Page bit value selecting the primary page (registers 0x80-0xFF).
pub const PAGE_PRIMARY: u8 = 0x00;

/// Read direction bit of the SPI command byte.
pub const SPI_READ: u8 = 0x80;

/// Address bits of the SPI command byte.
pub const SPI_ADDR_MASK: u8 = 0x7F;
