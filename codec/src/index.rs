//! Relative object index encoding and its bit-cost model.
//!
//! Changed objects are listed in ascending order; each index after the first
//! is sent as the step from the previous one. A step of one costs a single
//! bit, larger steps climb a table of tiers, each gated by one bit. The same
//! table drives [`count_relative_id_bits`], so the cost model cannot drift
//! from the encoder.

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::range::{bits_required, decode_bool, decode_int, encode_bool, encode_int};
use crate::settings::CodecSettings;

#[derive(Debug, Clone, Copy)]
struct IndexTier {
    min: u32,
    max: u32,
}

const INDEX_TIERS: [IndexTier; 5] = [
    IndexTier { min: 0, max: 6 },
    IndexTier { min: 7, max: 14 },
    IndexTier { min: 15, max: 30 },
    IndexTier { min: 31, max: 62 },
    IndexTier { min: 63, max: 126 },
];

/// First step handled by the absolute fallback range.
const FALLBACK_MIN: u32 = 127;

fn fallback_max(settings: &CodecSettings) -> u32 {
    settings.max_object_index().max(FALLBACK_MIN + 1)
}

/// Writes the first changed index as an absolute value.
pub fn encode_first_index(
    writer: &mut BitWriter,
    index: u32,
    settings: &CodecSettings,
) -> CodecResult<()> {
    encode_int(writer, index, 0, settings.max_object_index())
}

pub fn decode_first_index(reader: &mut BitReader<'_>, settings: &CodecSettings) -> CodecResult<u32> {
    decode_int(reader, 0, settings.max_object_index())
}

/// Writes the step from `previous` to `current`; `current` must be greater.
pub fn encode_relative_index(
    writer: &mut BitWriter,
    previous: u32,
    current: u32,
    settings: &CodecSettings,
) -> CodecResult<()> {
    if current <= previous {
        return Err(CodecError::ValueOutOfRange {
            value: current,
            min: previous.saturating_add(1),
            max: settings.max_object_index(),
        });
    }
    let delta = current - previous;

    let plus_one = delta == 1;
    encode_bool(writer, plus_one)?;
    if plus_one {
        return Ok(());
    }

    for tier in &INDEX_TIERS {
        let fits = delta <= tier.max;
        encode_bool(writer, fits)?;
        if fits {
            return encode_int(writer, delta, tier.min, tier.max);
        }
    }
    encode_int(writer, delta, FALLBACK_MIN, fallback_max(settings))
}

/// Reads the index that follows `previous`.
pub fn decode_relative_index(
    reader: &mut BitReader<'_>,
    previous: u32,
    settings: &CodecSettings,
) -> CodecResult<u32> {
    let delta = decode_step(reader, settings)?;
    previous
        .checked_add(delta)
        .ok_or(CodecError::ValueOutOfRange {
            value: delta,
            min: 1,
            max: settings.max_object_index(),
        })
}

fn decode_step(reader: &mut BitReader<'_>, settings: &CodecSettings) -> CodecResult<u32> {
    if decode_bool(reader)? {
        return Ok(1);
    }
    for tier in &INDEX_TIERS {
        if decode_bool(reader)? {
            return decode_int(reader, tier.min, tier.max);
        }
    }
    decode_int(reader, FALLBACK_MIN, fallback_max(settings))
}

/// Bits [`encode_relative_index`] spends on a step of `delta`.
#[must_use]
pub fn relative_index_bits(delta: u32, settings: &CodecSettings) -> usize {
    let mut bits = 1;
    if delta == 1 {
        return bits;
    }
    for tier in &INDEX_TIERS {
        bits += 1;
        if delta <= tier.max {
            return bits + bits_required(tier.min, tier.max) as usize;
        }
    }
    bits + bits_required(FALLBACK_MIN, fallback_max(settings)) as usize
}

/// Exact number of index bits a sparse list of the changed objects costs.
///
/// The first changed object is sent absolutely, every later one relative
/// to its predecessor. Nothing is written.
#[must_use]
pub fn count_relative_id_bits(changed: &[bool], settings: &CodecSettings) -> usize {
    let mut bits = 0;
    let mut previous: Option<u32> = None;
    for (index, _) in changed.iter().enumerate().filter(|(_, changed)| **changed) {
        let index = index as u32;
        bits += match previous {
            None => bits_required(0, settings.max_object_index()) as usize,
            Some(prev) => relative_index_bits(index - prev, settings),
        };
        previous = Some(index);
    }
    bits
}
