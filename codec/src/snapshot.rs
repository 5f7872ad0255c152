//! Full snapshot encoding/decoding.
//!
//! A full snapshot carries every body relative to the world origin and the
//! identity rotation, so it can be decoded without any history.

use bitstream::{BitReader, BitWriter};
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::quaternion::QuaternionCompressor;
use crate::range::{decode_int, encode_int};
use crate::relative::{
    decode_relative_orientation, decode_relative_position, encode_relative_orientation,
    encode_relative_position, QuantizedPosition,
};
use crate::settings::CodecSettings;
use crate::types::{BodyTransform, FrameId, Quat, Snapshot};

/// Encodes every body of `frame` into a new, trimmed buffer.
pub fn encode_full_snapshot(
    settings: &CodecSettings,
    frame: FrameId,
    bodies: &[BodyTransform],
) -> CodecResult<Vec<u8>> {
    settings.validate()?;
    let compressor = QuaternionCompressor::new(settings.orientation_bits)?;
    let identity = compressor.compress(Quat::IDENTITY);

    let mut writer = BitWriter::with_limit(settings.max_snapshot_bytes);
    write_header(&mut writer, frame, settings)?;
    encode_int(
        &mut writer,
        body_count(bodies.len()),
        0,
        settings.max_physics_objects,
    )?;

    for body in bodies {
        let position = QuantizedPosition::from_world(body.position, settings)?;
        encode_relative_position(&mut writer, position, QuantizedPosition::ORIGIN, settings)?;
        let rotation = compressor.compress(body.rotation);
        encode_relative_orientation(&mut writer, rotation, identity, &compressor)?;
    }

    let bits = writer.bits_written();
    let bytes = writer.finish();
    debug!(
        frame = frame.raw(),
        bodies = bodies.len(),
        bits,
        bytes = bytes.len(),
        "encoded full snapshot"
    );
    Ok(bytes)
}

/// Decodes a full snapshot.
pub fn decode_full_snapshot(settings: &CodecSettings, bytes: &[u8]) -> CodecResult<Snapshot> {
    settings.validate()?;
    let compressor = QuaternionCompressor::new(settings.orientation_bits)?;
    let identity = compressor.compress(Quat::IDENTITY);

    let mut reader = BitReader::new(bytes);
    let frame = read_header(&mut reader, settings)?;
    let count = decode_int(&mut reader, 0, settings.max_physics_objects)?;

    let mut bodies = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let position =
            decode_relative_position(&mut reader, QuantizedPosition::ORIGIN, settings)?;
        let rotation = decode_relative_orientation(&mut reader, identity, &compressor)?;
        bodies.push(BodyTransform::new(
            position.to_world(settings),
            compressor.decompress(rotation),
        ));
    }

    Ok(Snapshot { frame, bodies })
}

/// Reads only the frame number from a full or relative snapshot.
pub fn peek_frame(settings: &CodecSettings, bytes: &[u8]) -> CodecResult<FrameId> {
    settings.validate()?;
    read_header(&mut BitReader::new(bytes), settings)
}

pub(crate) fn write_header(
    writer: &mut BitWriter,
    frame: FrameId,
    settings: &CodecSettings,
) -> CodecResult<()> {
    if frame.raw() > settings.max_package_id {
        return Err(CodecError::FrameOutOfRange {
            frame,
            max: settings.max_package_id,
        });
    }
    encode_int(writer, frame.raw(), 0, settings.max_package_id)
}

pub(crate) fn read_header(
    reader: &mut BitReader<'_>,
    settings: &CodecSettings,
) -> CodecResult<FrameId> {
    decode_int(reader, 0, settings.max_package_id).map(FrameId::new)
}

/// Saturates so oversized frames fail the range check instead of wrapping.
pub(crate) fn body_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    fn bodies() -> Vec<BodyTransform> {
        vec![
            BodyTransform::new(Vec3::new(0.0, 0.0, 0.0), Quat::IDENTITY),
            BodyTransform::new(
                Vec3::new(1.5, -2.25, 9.99),
                Quat::new(0.1, 0.2, 0.3, 0.9).normalized(),
            ),
            BodyTransform::new(
                Vec3::new(-10.0, 10.0, 0.04),
                Quat::new(0.0, 1.0, 0.0, 0.0),
            ),
        ]
    }

    #[test]
    fn header_roundtrip() {
        let settings = CodecSettings::for_testing();
        let bytes = encode_full_snapshot(&settings, FrameId::new(200), &bodies()).unwrap();
        assert_eq!(peek_frame(&settings, &bytes).unwrap(), FrameId::new(200));
    }

    #[test]
    fn empty_frame_is_header_and_count() {
        let settings = CodecSettings::for_testing();
        let bytes = encode_full_snapshot(&settings, FrameId::new(1), &[]).unwrap();
        // 8 bits of frame + 7 bits of count
        assert_eq!(bytes.len(), 2);
        let snapshot = decode_full_snapshot(&settings, &bytes).unwrap();
        assert!(snapshot.bodies.is_empty());
    }

    #[test]
    fn identity_at_origin_is_compact() {
        let settings = CodecSettings::for_testing();
        let one = [BodyTransform::default()];
        let bytes = encode_full_snapshot(&settings, FrameId::new(1), &one).unwrap();
        // header 15 bits, position 13 bits, orientation 8 bits
        assert_eq!(bytes.len(), 5);
        let snapshot = decode_full_snapshot(&settings, &bytes).unwrap();
        assert_eq!(snapshot.bodies[0].position, Vec3::ZERO);
    }

    #[test]
    fn rejects_frame_above_max_package_id() {
        let settings = CodecSettings::for_testing();
        assert_eq!(
            encode_full_snapshot(&settings, FrameId::new(256), &bodies()),
            Err(CodecError::FrameOutOfRange {
                frame: FrameId::new(256),
                max: 255
            })
        );
    }

    #[test]
    fn rejects_too_many_bodies() {
        let settings = CodecSettings::for_testing();
        let many = vec![BodyTransform::default(); 65];
        assert!(matches!(
            encode_full_snapshot(&settings, FrameId::new(1), &many),
            Err(CodecError::ValueOutOfRange { value: 65, .. })
        ));
    }

    #[test]
    fn reports_buffer_overflow() {
        let settings = CodecSettings {
            max_snapshot_bytes: 4,
            ..CodecSettings::for_testing()
        };
        assert!(matches!(
            encode_full_snapshot(&settings, FrameId::new(1), &bodies()),
            Err(CodecError::BufferOverflow {
                capacity_bits: 32,
                ..
            })
        ));
    }

    #[test]
    fn truncated_input_is_an_error() {
        let settings = CodecSettings::for_testing();
        let bytes = encode_full_snapshot(&settings, FrameId::new(3), &bodies()).unwrap();
        let err = decode_full_snapshot(&settings, &bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, CodecError::Bitstream(_)));
    }
}
