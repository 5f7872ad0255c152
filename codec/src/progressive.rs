//! Progressive unsigned-range encoding.
//!
//! An ordered list of bit widths `[w0, w1, .., wk]` splits the unsigned
//! range into contiguous tiers `[0, 2^w0 - 1]`, `[2^w0, 2^w0 + 2^w1 - 1]`, ...
//! Every tier but the last is announced by one "in this tier" bit, so small
//! values stay compact while the whole range costs at most `k` extra bits.

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::range::{decode_bool, decode_int, encode_bool, encode_int};

/// Tier widths for quantized position deltas.
pub const POSITION_TIERS: &[u8] = &[5, 6, 7];

/// Tier widths for quantized orientation deltas.
pub const ORIENTATION_TIERS: &[u8] = &[4, 5, 7];

/// Exclusive upper bound of the values the tiers can represent.
#[must_use]
pub fn unsigned_range_limit(tiers: &[u8]) -> u32 {
    tiers.iter().map(|bits| 1u32 << bits).sum()
}

/// Writes `value` using the first tier that contains it.
pub fn encode_unsigned_range(writer: &mut BitWriter, value: u32, tiers: &[u8]) -> CodecResult<()> {
    let limit = unsigned_range_limit(tiers);
    if value >= limit {
        return Err(CodecError::ValueOutOfRange {
            value,
            min: 0,
            max: limit.saturating_sub(1),
        });
    }

    let Some((last, leading)) = tiers.split_last() else {
        return Err(CodecError::InvalidRange { min: 0, max: 0 });
    };
    let mut range_min = 0u32;
    for bits in leading {
        let range_max = range_min + ((1u32 << bits) - 1);
        let in_range = value <= range_max;
        encode_bool(writer, in_range)?;
        if in_range {
            return encode_int(writer, value, range_min, range_max);
        }
        range_min += 1u32 << bits;
    }
    encode_int(writer, value, range_min, range_min + ((1u32 << last) - 1))
}

/// Reads a value written by [`encode_unsigned_range`] with the same tiers.
pub fn decode_unsigned_range(reader: &mut BitReader<'_>, tiers: &[u8]) -> CodecResult<u32> {
    let Some((last, leading)) = tiers.split_last() else {
        return Err(CodecError::InvalidRange { min: 0, max: 0 });
    };
    let mut range_min = 0u32;
    for bits in leading {
        let range_max = range_min + ((1u32 << bits) - 1);
        if decode_bool(reader)? {
            return decode_int(reader, range_min, range_max);
        }
        range_min += 1u32 << bits;
    }
    decode_int(reader, range_min, range_min + ((1u32 << last) - 1))
}
