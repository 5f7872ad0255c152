//! Minimum-width integer fields over a known range.

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};

/// Number of bits needed to store any value in `[min, max]`.
///
/// Equals `ceil(log2(max - min + 1))`; zero when `min == max`.
#[must_use]
pub const fn bits_required(min: u32, max: u32) -> u8 {
    (u32::BITS - (max - min).leading_zeros()) as u8
}

/// Writes `value` as `value - min` in `bits_required(min, max)` bits.
pub fn encode_int(writer: &mut BitWriter, value: u32, min: u32, max: u32) -> CodecResult<()> {
    check_range(min, max)?;
    if value < min || value > max {
        return Err(CodecError::ValueOutOfRange { value, min, max });
    }
    writer.write_bits(value - min, bits_required(min, max))?;
    Ok(())
}

/// Reads a value written by [`encode_int`] with the same range.
///
/// Values above `max` that the field width can still express are rejected.
pub fn decode_int(reader: &mut BitReader<'_>, min: u32, max: u32) -> CodecResult<u32> {
    check_range(min, max)?;
    let raw = reader.read_bits(bits_required(min, max))?;
    let value = raw
        .checked_add(min)
        .filter(|value| *value <= max)
        .ok_or(CodecError::ValueOutOfRange {
            value: raw.saturating_add(min),
            min,
            max,
        })?;
    Ok(value)
}

/// Writes a boolean as a 1-bit integer, `0` = false.
pub fn encode_bool(writer: &mut BitWriter, value: bool) -> CodecResult<()> {
    writer.write_bit(value)?;
    Ok(())
}

pub fn decode_bool(reader: &mut BitReader<'_>) -> CodecResult<bool> {
    Ok(reader.read_bit()?)
}

/// Maps a signed integer onto the unsigned integers, small magnitudes first.
#[must_use]
pub const fn zigzag(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverse of [`zigzag`].
#[must_use]
pub const fn unzigzag(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

const fn check_range(min: u32, max: u32) -> CodecResult<()> {
    if min >= max {
        return Err(CodecError::InvalidRange { min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_required_matches_log2() {
        assert_eq!(bits_required(0, 1), 1);
        assert_eq!(bits_required(0, 3), 2);
        assert_eq!(bits_required(0, 6), 3);
        assert_eq!(bits_required(0, 10), 4);
        assert_eq!(bits_required(0, 15), 4);
        assert_eq!(bits_required(7, 14), 3);
        assert_eq!(bits_required(0, 1023), 10);
        assert_eq!(bits_required(0, 1024), 11);
        assert_eq!(bits_required(0, u32::MAX), 32);
    }

    #[test]
    fn int_roundtrip_uses_minimum_width() {
        let mut writer = BitWriter::new();
        encode_int(&mut writer, 3, 0, 10).unwrap();
        assert_eq!(writer.bits_written(), 4);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(decode_int(&mut reader, 0, 10).unwrap(), 3);
    }

    #[test]
    fn int_roundtrip_with_offset() {
        let mut writer = BitWriter::new();
        encode_int(&mut writer, 127, 127, 1023).unwrap();
        encode_int(&mut writer, 1023, 127, 1023).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(decode_int(&mut reader, 127, 1023).unwrap(), 127);
        assert_eq!(decode_int(&mut reader, 127, 1023).unwrap(), 1023);
    }

    #[test]
    fn int_rejects_invalid_range() {
        let mut writer = BitWriter::new();
        assert_eq!(
            encode_int(&mut writer, 5, 5, 5),
            Err(CodecError::InvalidRange { min: 5, max: 5 })
        );
        assert_eq!(
            encode_int(&mut writer, 5, 9, 2),
            Err(CodecError::InvalidRange { min: 9, max: 2 })
        );
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn int_rejects_value_outside_range() {
        let mut writer = BitWriter::new();
        assert_eq!(
            encode_int(&mut writer, 11, 0, 10),
            Err(CodecError::ValueOutOfRange {
                value: 11,
                min: 0,
                max: 10
            })
        );
        assert!(matches!(
            encode_int(&mut writer, 2, 3, 10),
            Err(CodecError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn decode_rejects_value_above_max() {
        // 4 bits of 0b1111 = 15 > 10
        let bytes = [0b1111_0000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(
            decode_int(&mut reader, 0, 10),
            Err(CodecError::ValueOutOfRange {
                value: 15,
                min: 0,
                max: 10
            })
        );
    }

    #[test]
    fn bool_roundtrip() {
        let mut writer = BitWriter::new();
        encode_bool(&mut writer, true).unwrap();
        encode_bool(&mut writer, false).unwrap();
        assert_eq!(writer.bits_written(), 2);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(decode_bool(&mut reader).unwrap());
        assert!(!decode_bool(&mut reader).unwrap());
    }

    #[test]
    fn zigzag_orders_by_magnitude() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(-2), 3);
        assert_eq!(zigzag(2), 4);
        for n in [-70_000, -15, -1, 0, 1, 8, 70_000, i32::MIN, i32::MAX] {
            assert_eq!(unzigzag(zigzag(n)), n);
        }
    }
}
