//! Compensation of raw ADC codes into physical units
//!
//! Temperature comes first: its fine term `t_fine` is an input of the
//! pressure, humidity and gas formulas. [`FineTemperature`] can only be
//! obtained from [`compensate_temperature`], so the other stages cannot be
//! called with a stale or made-up value.
//!
//! Everything runs in `f64`. Truncation happens only where the device's own
//! arithmetic truncates: `t_fine` and the final gas resistance.

use libm::floor;

use crate::calibration::Calibration;
use crate::errors::InvalidReading;
use crate::raw::RawSample;
use crate::time::Timestamp;
use crate::variant::VariantProfile;

/// `lookupTable1`, indexed by gas range
static GAS_RANGE_CONST_1: [f64; 16] = [
    2147483647.0,
    2147483647.0,
    2147483647.0,
    2147483647.0,
    2147483647.0,
    2126008810.0,
    2147483647.0,
    2130303777.0,
    2147483647.0,
    2147483647.0,
    2143188679.0,
    2136746228.0,
    2147483647.0,
    2126008810.0,
    2147483647.0,
    2147483647.0,
];

/// `lookupTable2`, indexed by gas range
static GAS_RANGE_CONST_2: [f64; 16] = [
    4096000000.0,
    2048000000.0,
    1024000000.0,
    512000000.0,
    255744255.0,
    127110228.0,
    64000000.0,
    32258064.0,
    16016016.0,
    8000000.0,
    4000000.0,
    2000000.0,
    1000000.0,
    500000.0,
    250000.0,
    125000.0,
];

/// Fine temperature term shared by all compensation stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FineTemperature(i32);

impl FineTemperature {
    pub fn value(self) -> i32 {
        self.0
    }

    /// Temperature in °C before the user offset
    pub fn celsius(self) -> f64 {
        ((self.0 as f64 * 5.0 + 128.0) / 256.0) / 100.0
    }
}

/// User offsets, resolved from the configuration once
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offsets {
    /// Added to `t_fine`
    pub fine_ticks: i32,
    /// Added to the reported temperature (°C)
    pub temperature_c: f64,
    /// Added to the clamped humidity (%)
    pub humidity_pct: f64,
}

/// Convert a temperature offset in °C into `t_fine` ticks
///
/// The inverse of [`FineTemperature::celsius`] on hundredths of a degree,
/// truncated toward zero. Zero maps to zero.
pub fn temperature_offset_ticks(offset_c: f32) -> i32 {
    if offset_c == 0.0 {
        return 0;
    }
    let hundredths = libm::trunc(libm::fabs(f64::from(offset_c)) * 100.0) as i64;
    let magnitude = (((hundredths << 8) - 128) / 5) as f64;
    libm::trunc(libm::copysign(magnitude, f64::from(offset_c))) as i32
}

/// Temperature compensation, producing `t_fine`
pub fn compensate_temperature(
    calibration: &Calibration,
    adc: u32,
    offset_ticks: i32,
) -> FineTemperature {
    let [t1, t2, t3] = calibration.temperature;
    let var1 = adc as f64 / 8.0 - t1 * 2.0;
    let var2 = var1 * t2 / 2048.0;
    let half = var1 / 2.0;
    let var3 = half * half / 4096.0 * (t3 * 16.0) / 16384.0;

    FineTemperature((floor(var2 + var3) as i32).saturating_add(offset_ticks))
}

/// Pressure compensation in hPa
///
/// Fails when the calibration zeroes the scaling term, which would otherwise
/// divide by zero.
pub fn compensate_pressure(
    calibration: &Calibration,
    adc: u32,
    t_fine: FineTemperature,
) -> Result<f64, InvalidReading> {
    let [p1, p2, p3, p4, p5, p6, p7, p8, p9, p10] = calibration.pressure;

    let mut var1 = t_fine.value() as f64 / 2.0 - 64000.0;
    let quarter = var1 / 4.0;
    let mut var2 = quarter * quarter / 2048.0 * p6 / 4.0;
    var2 += var1 * p5 * 2.0;
    var2 = var2 / 4.0 + p4 * 65536.0;
    var1 = (quarter * quarter / 8192.0 * (p3 * 32.0) / 8.0) + p2 * var1 / 2.0;
    var1 /= 262144.0;
    var1 = (32768.0 + var1) * p1 / 32768.0;

    if var1 == 0.0 {
        return Err(InvalidReading { reason: "pressure scaling term is zero" });
    }

    let mut calc = 1048576.0 - adc as f64;
    calc = (calc - var2 / 4096.0) * 3125.0;
    calc = calc / var1 * 2.0;

    let eighth = calc / 8.0;
    let var1 = p9 * (eighth * eighth / 8192.0) / 4096.0;
    let var2 = (calc / 4.0) * p8 / 8192.0;
    let shifted = calc / 256.0;
    let var3 = shifted * shifted * shifted * p10 / 131072.0;
    calc += (var1 + var2 + var3 + p7 * 128.0) / 16.0;

    Ok(calc / 100.0)
}

/// Relative humidity in %, clamped to [0, 100]
pub fn compensate_humidity(calibration: &Calibration, adc: u16, t_fine: FineTemperature) -> f64 {
    let [h1, h2, h3, h4, h5, h6, h7] = calibration.humidity;
    let temp_scaled = (t_fine.value() as f64 * 5.0 + 128.0) / 256.0;

    let var1 = adc as f64 - h1 * 16.0 - temp_scaled * h3 / 200.0;
    let var2 = h2
        * (temp_scaled * h4 / 100.0
            + (temp_scaled * (temp_scaled * h5 / 100.0) / 64.0) / 100.0
            + 16384.0)
        / 1024.0;
    let var3 = var1 * var2;
    let var4 = (h6 * 128.0 + temp_scaled * h7 / 100.0) / 16.0;
    let scaled = var3 / 16384.0;
    let var5 = scaled * scaled / 1024.0;
    let var6 = var4 * var5 / 2.0;
    let humidity = ((var3 + var6) / 1024.0 * 1000.0) / 4096.0 / 1000.0;

    humidity.clamp(0.0, 100.0)
}

/// Gas resistance in Ω for the high-range part
///
/// Defined for every 10-bit ADC code. The `Result` only matches [`GasFormula`](crate::variant::GasFormula).
pub fn gas_resistance_high(
    _calibration: &Calibration,
    raw: &RawSample,
    _t_fine: FineTemperature,
) -> Result<u32, InvalidReading> {
    let var1 = (262144u32 >> (raw.gas_range & 0x0F)) as f64;
    // A 10-bit ADC keeps this at 2560 or above.
    let var2 = (raw.gas_adc as f64 - 512.0) * 3.0 + 4096.0;
    debug_assert!(var2 > 0.0, "gas ADC wider than 10 bits");
    Ok((1000.0 * var1 / var2 * 100.0) as u32)
}

/// Gas resistance in Ω for the original part, via the range lookup tables
pub fn gas_resistance_low(
    calibration: &Calibration,
    raw: &RawSample,
    _t_fine: FineTemperature,
) -> Result<u32, InvalidReading> {
    let range = usize::from(raw.gas_range & 0x0F);
    let var1 = (1340.0 + 5.0 * calibration.range_sw_err) * GAS_RANGE_CONST_1[range] / 65536.0;
    let var2 = raw.gas_adc as f64 * 32768.0 - 16777216.0 + var1;
    if var2 == 0.0 {
        return Err(InvalidReading { reason: "gas conversion term is zero" });
    }
    let var3 = GAS_RANGE_CONST_2[range] * var1 / 512.0;
    let resistance = (var3 + var2 / 2.0) / var2;
    if resistance < 0.0 {
        return Err(InvalidReading { reason: "negative gas resistance" });
    }
    Ok(resistance as u32)
}

/// Compensated values of one measurement cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// °C
    pub temperature: f32,
    /// hPa
    pub pressure: f32,
    /// % relative humidity
    pub humidity: f32,
    /// Ω
    pub gas_resistance: u32,
    /// Clock value when the conversion was collected
    pub timestamp: Timestamp,
    /// Heater reached its target before the gas conversion
    pub heater_stable: bool,
    /// Gas conversion completed
    pub gas_valid: bool,
}

/// Run all stages on one raw sample
pub fn compensate(
    calibration: &Calibration,
    profile: &VariantProfile,
    raw: &RawSample,
    offsets: &Offsets,
    timestamp: Timestamp,
) -> Result<Reading, InvalidReading> {
    let t_fine = compensate_temperature(calibration, raw.temperature_adc, offsets.fine_ticks);
    let pressure = compensate_pressure(calibration, raw.pressure_adc, t_fine)?;
    let humidity = compensate_humidity(calibration, raw.humidity_adc, t_fine);
    let gas_resistance = profile.gas_resistance(calibration, raw, t_fine)?;

    Ok(Reading {
        temperature: (t_fine.celsius() + offsets.temperature_c) as f32,
        pressure: pressure as f32,
        humidity: (humidity + offsets.humidity_pct) as f32,
        gas_resistance,
        timestamp,
        heater_stable: raw.heat_stable,
        gas_valid: raw.gas_valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::ChipVariant;

    /// Coefficients of a typical production part
    fn calibration() -> Calibration {
        Calibration {
            temperature: [27504.0, 26435.0, -1000.0],
            pressure: [36477.0, -10685.0, 88.0, 7310.0, -18.0, 30.0, 30.0, -3.0, -2523.0, 30.0],
            humidity: [683.0, 1021.0, 0.0, 45.0, 20.0, 120.0, -100.0],
            gas: [-30.0, -5700.0, 18.0],
            heater_range: 1.0,
            heater_trim: 38.0,
            range_sw_err: 0.0,
        }
    }

    #[test]
    fn temperature_reference_value() {
        let t_fine = compensate_temperature(&calibration(), 519888, 0);
        assert_eq!(t_fine.value(), 122858);
        assert!((t_fine.celsius() - 24.00).abs() < 0.1);
    }

    #[test]
    fn offset_ticks_follow_sign() {
        assert_eq!(temperature_offset_ticks(0.0), 0);
        assert_eq!(temperature_offset_ticks(1.0), 5094);
        assert_eq!(temperature_offset_ticks(-1.0), -5094);
        assert_eq!(temperature_offset_ticks(0.5), 2534);
    }

    #[test]
    fn offset_ticks_shift_temperature_by_the_offset() {
        let calib = calibration();
        let base = compensate_temperature(&calib, 519888, 0).celsius();
        let shifted =
            compensate_temperature(&calib, 519888, temperature_offset_ticks(2.0)).celsius();
        assert!((shifted - base - 2.0).abs() < 0.01);
    }

    #[test]
    fn pressure_is_plausible_at_room_temperature() {
        let calib = calibration();
        let t_fine = compensate_temperature(&calib, 519888, 0);
        let hpa = compensate_pressure(&calib, 350000, t_fine).unwrap();
        assert!((900.0..1100.0).contains(&hpa), "pressure {hpa}");
    }

    #[test]
    fn zero_p1_is_invalid() {
        let mut calib = calibration();
        calib.pressure[0] = 0.0;
        let t_fine = compensate_temperature(&calib, 519888, 0);
        let err = compensate_pressure(&calib, 350000, t_fine).unwrap_err();
        assert_eq!(err.reason, "pressure scaling term is zero");
    }

    #[test]
    fn humidity_is_clamped() {
        let calib = calibration();
        let t_fine = compensate_temperature(&calib, 519888, 0);
        assert_eq!(compensate_humidity(&calib, 0, t_fine), 0.0);
        assert_eq!(compensate_humidity(&calib, u16::MAX, t_fine), 100.0);

        let mid = compensate_humidity(&calib, 25000, t_fine);
        assert!(mid > 0.0 && mid < 100.0);
    }

    #[test]
    fn gas_low_reference_value() {
        let raw = RawSample { gas_adc: 6400, gas_range: 0, ..RawSample::default() };
        let calib = calibration();
        let t_fine = compensate_temperature(&calib, 519888, 0);
        let ohm = gas_resistance_low(&calib, &raw, t_fine).unwrap();
        assert!((1_483_100..=1_483_140).contains(&ohm), "resistance {ohm}");
    }

    #[test]
    fn gas_high_formula() {
        let raw = RawSample { gas_adc: 512, gas_range: 4, ..RawSample::default() };
        let calib = calibration();
        let t_fine = compensate_temperature(&calib, 519888, 0);
        // 262144 >> 4 = 16384; 1000 * 16384 / 4096 * 100
        assert_eq!(gas_resistance_high(&calib, &raw, t_fine).unwrap(), 400_000);
    }

    #[test]
    fn gas_high_covers_the_whole_adc_range() {
        let calib = calibration();
        let t_fine = compensate_temperature(&calib, 519888, 0);
        let at = |adc, range| {
            let raw = RawSample { gas_adc: adc, gas_range: range, ..RawSample::default() };
            gas_resistance_high(&calib, &raw, t_fine).unwrap()
        };
        // 1000 * 262144 / 2560 * 100, and 1000 * 8 / 5629 * 100 at the top range
        assert_eq!(at(0, 0), 10_240_000);
        assert_eq!(at(1023, 15), 142);
    }

    #[test]
    fn pipeline_dispatches_on_variant() {
        let calib = calibration();
        let raw = RawSample {
            temperature_adc: 519888,
            pressure_adc: 350000,
            humidity_adc: 25000,
            gas_adc: 512,
            gas_range: 4,
            ..RawSample::default()
        };
        let offsets = Offsets::default();

        let high = compensate(&calib, &ChipVariant::GasHigh.profile(), &raw, &offsets, 7).unwrap();
        let low = compensate(&calib, &ChipVariant::GasLow.profile(), &raw, &offsets, 7).unwrap();

        assert_eq!(high.gas_resistance, 400_000);
        assert_ne!(low.gas_resistance, high.gas_resistance);
        assert_eq!(high.temperature, low.temperature);
        assert_eq!(high.timestamp, 7);
    }

    #[test]
    fn humidity_offset_applies_after_clamp() {
        let calib = calibration();
        let raw = RawSample {
            temperature_adc: 519888,
            pressure_adc: 350000,
            humidity_adc: u16::MAX,
            gas_adc: 512,
            ..RawSample::default()
        };
        let offsets = Offsets { humidity_pct: -3.0, ..Offsets::default() };
        let reading = compensate(&calib, &ChipVariant::GasHigh.profile(), &raw, &offsets, 0).unwrap();
        assert_eq!(reading.humidity, 97.0);
    }
}
