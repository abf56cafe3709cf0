//! Raw IMU word → physical unit conversion.
//!
//! The gloves report each axis as a 16-bit two's complement word. Depending on
//! how the frame was serialized the word shows up either signed
//! (`-32768..=32767`) or as the unsigned wire value (`0..=65535`); both are
//! accepted. Anything else cannot come from the sensor.

use crate::domain::layout::Scale;
use thiserror::Error;

pub const RAW_MIN: i64 = i16::MIN as i64;
pub const RAW_WIRE_MAX: i64 = u16::MAX as i64;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("raw value {0} is outside the 16-bit sensor range")]
pub struct OutOfRange(pub i64);

/// 將原始值轉為有號 16 位元整數
pub fn to_signed(raw: i64) -> Result<i16, OutOfRange> {
    match raw {
        RAW_MIN..=0x7FFF => Ok(raw as i16),
        0x8000..=RAW_WIRE_MAX => Ok((raw - 0x1_0000) as i16),
        _ => Err(OutOfRange(raw)),
    }
}

pub fn to_physical(raw: i64, scale: Scale) -> Result<f64, OutOfRange> {
    let signed = to_signed(raw)?;
    Ok(f64::from(signed) / scale.lsb_per_unit + scale.offset)
}

/// Inverse of [`to_physical`], rounded to the nearest raw count.
pub fn to_raw(value: f64, scale: Scale) -> i16 {
    let counts = ((value - scale.offset) * scale.lsb_per_unit).round();
    counts.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::{ACCELEROMETER_LSB_PER_G, GYROSCOPE_LSB_PER_DPS};

    #[test]
    fn test_full_scale_negative_is_exact() {
        let scale = Scale::new(16384.0);
        assert_eq!(to_physical(-32768, scale).unwrap(), -2.0);
    }

    #[test]
    fn test_glove_scales() {
        let acc = Scale::new(ACCELEROMETER_LSB_PER_G);
        let gyro = Scale::new(GYROSCOPE_LSB_PER_DPS);

        assert_eq!(to_physical(4096, acc).unwrap(), 1.0);
        assert_eq!(to_physical(-2048, acc).unwrap(), -0.5);
        assert_eq!(to_physical(328, gyro).unwrap(), 328.0 / 32.8);
        assert_eq!(to_physical(0, gyro).unwrap(), 0.0);
    }

    #[test]
    fn test_unsigned_wire_words_are_twos_complement() {
        let acc = Scale::new(ACCELEROMETER_LSB_PER_G);

        assert_eq!(to_signed(65535).unwrap(), -1);
        assert_eq!(to_signed(32768).unwrap(), i16::MIN);
        assert_eq!(to_physical(65535 - 4095, acc).unwrap(), -1.0);
    }

    #[test]
    fn test_values_outside_sensor_range_fail() {
        let acc = Scale::new(ACCELEROMETER_LSB_PER_G);

        assert_eq!(to_physical(-32769, acc), Err(OutOfRange(-32769)));
        assert_eq!(to_physical(65536, acc), Err(OutOfRange(65536)));
    }

    #[test]
    fn test_offset_is_applied_after_scaling() {
        let scale = Scale {
            lsb_per_unit: 100.0,
            offset: -1.5,
        };
        assert_eq!(to_physical(300, scale).unwrap(), 1.5);
        assert_eq!(to_raw(1.5, scale), 300);
    }

    #[test]
    fn test_inverse_recovers_every_raw_value() {
        let scales = [
            Scale::new(ACCELEROMETER_LSB_PER_G),
            Scale::new(GYROSCOPE_LSB_PER_DPS),
            Scale::new(16384.0),
            Scale {
                lsb_per_unit: 131.0,
                offset: 0.25,
            },
        ];

        for scale in scales {
            for raw in i16::MIN..=i16::MAX {
                let value = to_physical(i64::from(raw), scale).unwrap();
                assert_eq!(to_raw(value, scale), raw, "scale {:?}", scale);
            }
        }
    }
}
