//! Delta encoding of positions and orientations against a baseline.

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::progressive::{
    decode_unsigned_range, encode_unsigned_range, unsigned_range_limit, ORIENTATION_TIERS,
    POSITION_TIERS,
};
use crate::quaternion::{CompressedQuaternion, QuaternionCompressor};
use crate::range::{decode_bool, decode_int, encode_bool, encode_int, unzigzag, zigzag};
use crate::settings::CodecSettings;
use crate::types::Vec3;

/// Position deltas at or below this use a fixed 4-bit field per axis.
const SMALL_POSITION_DELTA: u32 = 15;

/// Orientation deltas at or below this use a fixed 2-bit field per component.
const SMALL_ORIENTATION_DELTA: u32 = 3;

/// A position in integer quantization units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QuantizedPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl QuantizedPosition {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    /// Rounds a world position to the nearest unit.
    ///
    /// Fails if any axis lies outside `+/-position_bounds_in_meters`.
    pub fn from_world(position: Vec3, settings: &CodecSettings) -> CodecResult<Self> {
        let max_units = settings.max_position_units();
        let quantize = |meters: f64| -> CodecResult<i32> {
            if !meters.is_finite() {
                return Err(CodecError::NonFinitePosition);
            }
            let units = (meters * f64::from(settings.units_per_meter)).round();
            if units.abs() > max_units as f64 {
                return Err(CodecError::PositionOutOfBounds {
                    units: units as i64,
                    max_units,
                });
            }
            Ok(units as i32)
        };
        Ok(Self {
            x: quantize(position.x)?,
            y: quantize(position.y)?,
            z: quantize(position.z)?,
        })
    }

    #[must_use]
    pub fn to_world(self, settings: &CodecSettings) -> Vec3 {
        let scale = f64::from(settings.units_per_meter);
        Vec3::new(
            f64::from(self.x) / scale,
            f64::from(self.y) / scale,
            f64::from(self.z) / scale,
        )
    }

    const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    const fn from_array(v: [i32; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

/// Writes `current` as a delta from `baseline`.
///
/// Layout: `allSmall` bit, then either three 4-bit deltas, or a `tooLarge`
/// bit followed by three progressive or three fixed-width deltas.
pub fn encode_relative_position(
    writer: &mut BitWriter,
    current: QuantizedPosition,
    baseline: QuantizedPosition,
    settings: &CodecSettings,
) -> CodecResult<()> {
    let (current, baseline) = (current.to_array(), baseline.to_array());
    let mut deltas = [0u32; 3];
    for axis in 0..3 {
        let delta = current[axis].checked_sub(baseline[axis]).ok_or(
            CodecError::PositionOutOfBounds {
                units: i64::from(current[axis]) - i64::from(baseline[axis]),
                max_units: settings.max_position_units(),
            },
        )?;
        deltas[axis] = zigzag(delta);
    }

    let all_small = deltas.iter().all(|d| *d <= SMALL_POSITION_DELTA);
    encode_bool(writer, all_small)?;
    if all_small {
        for delta in deltas {
            encode_int(writer, delta, 0, SMALL_POSITION_DELTA)?;
        }
        return Ok(());
    }

    let large_limit = unsigned_range_limit(POSITION_TIERS);
    let too_large = deltas.iter().any(|d| *d >= large_limit);
    encode_bool(writer, too_large)?;
    for delta in deltas {
        if too_large {
            encode_int(writer, delta, 0, settings.position_fallback_max())?;
        } else {
            encode_unsigned_range(writer, delta, POSITION_TIERS)?;
        }
    }
    Ok(())
}

/// Reads a position written by [`encode_relative_position`].
pub fn decode_relative_position(
    reader: &mut BitReader<'_>,
    baseline: QuantizedPosition,
    settings: &CodecSettings,
) -> CodecResult<QuantizedPosition> {
    let mut deltas = [0u32; 3];
    if decode_bool(reader)? {
        for delta in &mut deltas {
            *delta = decode_int(reader, 0, SMALL_POSITION_DELTA)?;
        }
    } else {
        let too_large = decode_bool(reader)?;
        for delta in &mut deltas {
            *delta = if too_large {
                decode_int(reader, 0, settings.position_fallback_max())?
            } else {
                decode_unsigned_range(reader, POSITION_TIERS)?
            };
        }
    }

    let baseline = baseline.to_array();
    let mut out = [0i32; 3];
    for axis in 0..3 {
        let signed = unzigzag(deltas[axis]);
        out[axis] = baseline[axis].checked_add(signed).ok_or(
            CodecError::PositionOutOfBounds {
                units: i64::from(baseline[axis]) + i64::from(signed),
                max_units: settings.max_position_units(),
            },
        )?;
    }
    Ok(QuantizedPosition::from_array(out))
}

/// Writes `current` as a delta from `baseline`, or in full when the two do
/// not share a dropped component or the deltas exceed the tiered range.
pub fn encode_relative_orientation(
    writer: &mut BitWriter,
    current: CompressedQuaternion,
    baseline: CompressedQuaternion,
    compressor: &QuaternionCompressor,
) -> CodecResult<()> {
    let large_limit = unsigned_range_limit(ORIENTATION_TIERS);
    let deltas = (current.largest == baseline.largest)
        .then(|| {
            let mut deltas = [0u32; 3];
            for (i, delta) in deltas.iter_mut().enumerate() {
                *delta = zigzag(current.components[i] as i32 - baseline.components[i] as i32);
            }
            deltas
        })
        .filter(|deltas| deltas.iter().all(|d| *d < large_limit));

    encode_bool(writer, deltas.is_some())?;
    match deltas {
        Some(deltas) => {
            let all_small = deltas.iter().all(|d| *d <= SMALL_ORIENTATION_DELTA);
            encode_bool(writer, all_small)?;
            for delta in deltas {
                if all_small {
                    encode_int(writer, delta, 0, SMALL_ORIENTATION_DELTA)?;
                } else {
                    encode_unsigned_range(writer, delta, ORIENTATION_TIERS)?;
                }
            }
        }
        None => {
            writer.write_bits(u32::from(current.largest), 2)?;
            for component in current.components {
                writer.write_bits(component, compressor.bits())?;
            }
        }
    }
    Ok(())
}

/// Reads an orientation written by [`encode_relative_orientation`].
pub fn decode_relative_orientation(
    reader: &mut BitReader<'_>,
    baseline: CompressedQuaternion,
    compressor: &QuaternionCompressor,
) -> CodecResult<CompressedQuaternion> {
    if !decode_bool(reader)? {
        let largest = reader.read_bits(2)? as u8;
        let mut components = [0u32; 3];
        for component in &mut components {
            *component = reader.read_bits(compressor.bits())?;
        }
        return Ok(CompressedQuaternion {
            largest,
            components,
        });
    }

    let all_small = decode_bool(reader)?;
    let mut components = [0u32; 3];
    for (i, component) in components.iter_mut().enumerate() {
        let delta = if all_small {
            decode_int(reader, 0, SMALL_ORIENTATION_DELTA)?
        } else {
            decode_unsigned_range(reader, ORIENTATION_TIERS)?
        };
        let value = i64::from(baseline.components[i]) + i64::from(unzigzag(delta));
        if value < 0 || value > i64::from(compressor.max_value()) {
            return Err(CodecError::CorruptOrientation {
                component: i,
                value,
            });
        }
        *component = value as u32;
    }
    Ok(CompressedQuaternion {
        largest: baseline.largest,
        components,
    })
}
