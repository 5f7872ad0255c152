//! Relative snapshot encoding/decoding against a baseline frame.
//!
//! Only bodies whose transform differs from the baseline are sent. They are
//! addressed either by a sparse list of indices or by one flag per body,
//! whichever costs fewer bits.

use bitstream::{BitReader, BitWriter};
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::index::{
    count_relative_id_bits, decode_first_index, decode_relative_index, encode_first_index,
    encode_relative_index,
};
use crate::quaternion::QuaternionCompressor;
use crate::range::{decode_bool, decode_int, encode_bool, encode_int};
use crate::relative::{
    decode_relative_orientation, decode_relative_position, encode_relative_orientation,
    encode_relative_position, QuantizedPosition,
};
use crate::settings::CodecSettings;
use crate::snapshot::{body_count, read_header, write_header};
use crate::types::{BodyTransform, FrameId, Snapshot};

/// How a relative snapshot addresses the bodies that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeEncoding {
    /// A count followed by ascending indices of changed bodies.
    Sparse,
    /// One changed flag per body slot.
    Dense,
}

/// Picks the cheaper addressing for a change pattern.
///
/// Sparse wins only when its index bits cost less than one flag per slot.
#[must_use]
pub fn select_relative_encoding(changed: &[bool], settings: &CodecSettings) -> RelativeEncoding {
    if count_relative_id_bits(changed, settings) < changed.len() {
        RelativeEncoding::Sparse
    } else {
        RelativeEncoding::Dense
    }
}

/// Encodes `bodies` as a delta against `base_bodies`.
pub fn encode_relative_snapshot(
    settings: &CodecSettings,
    frame: FrameId,
    bodies: &[BodyTransform],
    base_bodies: &[BodyTransform],
) -> CodecResult<Vec<u8>> {
    settings.validate()?;
    if bodies.len() != base_bodies.len() {
        return Err(CodecError::ObjectCountMismatch {
            expected: base_bodies.len(),
            found: bodies.len(),
        });
    }
    if body_count(bodies.len()) > settings.max_physics_objects {
        return Err(CodecError::ValueOutOfRange {
            value: body_count(bodies.len()),
            min: 0,
            max: settings.max_physics_objects,
        });
    }
    let compressor = QuaternionCompressor::new(settings.orientation_bits)?;

    let mut writer = BitWriter::with_limit(settings.max_snapshot_bytes);
    write_header(&mut writer, frame, settings)?;

    let changed: Vec<bool> = bodies
        .iter()
        .zip(base_bodies)
        .map(|(body, base)| body != base)
        .collect();
    let num_changed = changed.iter().filter(|c| **c).count();
    let encoding = select_relative_encoding(&changed, settings);
    debug!(
        frame = frame.raw(),
        changed = num_changed,
        slots = changed.len(),
        index_bits = count_relative_id_bits(&changed, settings),
        ?encoding,
        "selected relative encoding"
    );

    encode_bool(&mut writer, encoding == RelativeEncoding::Sparse)?;
    match encoding {
        RelativeEncoding::Sparse => {
            encode_int(
                &mut writer,
                body_count(num_changed),
                0,
                settings.max_object_index(),
            )?;
            let mut previous: Option<u32> = None;
            for (index, _) in changed.iter().enumerate().filter(|(_, c)| **c) {
                let index = index as u32;
                match previous {
                    None => encode_first_index(&mut writer, index, settings)?,
                    Some(prev) => encode_relative_index(&mut writer, prev, index, settings)?,
                }
                let slot = index as usize;
                write_body_delta(
                    &mut writer,
                    &bodies[slot],
                    &base_bodies[slot],
                    settings,
                    &compressor,
                )?;
                previous = Some(index);
            }
        }
        RelativeEncoding::Dense => {
            for ((body, base), changed) in bodies.iter().zip(base_bodies).zip(&changed) {
                encode_bool(&mut writer, *changed)?;
                if *changed {
                    write_body_delta(&mut writer, body, base, settings, &compressor)?;
                }
            }
        }
    }

    let bytes = writer.finish();
    debug!(
        frame = frame.raw(),
        bytes = bytes.len(),
        "encoded relative snapshot"
    );
    Ok(bytes)
}

/// Decodes a relative snapshot against the bodies of its baseline frame.
///
/// Bodies the snapshot does not mention are copied from the baseline
/// unchanged.
pub fn decode_relative_snapshot(
    settings: &CodecSettings,
    bytes: &[u8],
    base_bodies: &[BodyTransform],
) -> CodecResult<Snapshot> {
    settings.validate()?;
    let compressor = QuaternionCompressor::new(settings.orientation_bits)?;

    let mut reader = BitReader::new(bytes);
    let frame = read_header(&mut reader, settings)?;
    let mut bodies = base_bodies.to_vec();

    if decode_bool(&mut reader)? {
        let num_changed = decode_int(&mut reader, 0, settings.max_object_index())?;
        let mut previous: Option<u32> = None;
        for _ in 0..num_changed {
            let index = match previous {
                None => decode_first_index(&mut reader, settings)?,
                Some(prev) => decode_relative_index(&mut reader, prev, settings)?,
            };
            let body = bodies
                .get_mut(index as usize)
                .ok_or(CodecError::ObjectIndexOutOfRange {
                    index,
                    count: base_bodies.len(),
                })?;
            *body = read_body_delta(&mut reader, body, settings, &compressor)?;
            previous = Some(index);
        }
    } else {
        for body in &mut bodies {
            if decode_bool(&mut reader)? {
                *body = read_body_delta(&mut reader, body, settings, &compressor)?;
            }
        }
    }

    Ok(Snapshot { frame, bodies })
}

/// Reads the frame number and addressing mode of a relative snapshot.
pub fn peek_relative_encoding(
    settings: &CodecSettings,
    bytes: &[u8],
) -> CodecResult<(FrameId, RelativeEncoding)> {
    settings.validate()?;
    let mut reader = BitReader::new(bytes);
    let frame = read_header(&mut reader, settings)?;
    let encoding = if decode_bool(&mut reader)? {
        RelativeEncoding::Sparse
    } else {
        RelativeEncoding::Dense
    };
    Ok((frame, encoding))
}

/// Position and rotation are each gated by their own changed flag.
fn write_body_delta(
    writer: &mut BitWriter,
    body: &BodyTransform,
    base: &BodyTransform,
    settings: &CodecSettings,
    compressor: &QuaternionCompressor,
) -> CodecResult<()> {
    let position_changed = body.position != base.position;
    encode_bool(writer, position_changed)?;
    if position_changed {
        encode_relative_position(
            writer,
            QuantizedPosition::from_world(body.position, settings)?,
            QuantizedPosition::from_world(base.position, settings)?,
            settings,
        )?;
    }

    let rotation_changed = body.rotation != base.rotation;
    encode_bool(writer, rotation_changed)?;
    if rotation_changed {
        encode_relative_orientation(
            writer,
            compressor.compress(body.rotation),
            compressor.compress(base.rotation),
            compressor,
        )?;
    }
    Ok(())
}

fn read_body_delta(
    reader: &mut BitReader<'_>,
    base: &BodyTransform,
    settings: &CodecSettings,
    compressor: &QuaternionCompressor,
) -> CodecResult<BodyTransform> {
    let mut body = *base;
    if decode_bool(reader)? {
        let baseline = QuantizedPosition::from_world(base.position, settings)?;
        body.position = decode_relative_position(reader, baseline, settings)?.to_world(settings);
    }
    if decode_bool(reader)? {
        let baseline = compressor.compress(base.rotation);
        let rotation = decode_relative_orientation(reader, baseline, compressor)?;
        body.rotation = compressor.decompress(rotation);
    }
    Ok(body)
}
