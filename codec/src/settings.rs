//! Wire format settings shared by encoder and decoder.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::quaternion::{MAX_QUATERNION_BITS, MIN_QUATERNION_BITS};

/// Settings that shape the wire format.
///
/// Both peers must use identical settings; nothing is negotiated on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CodecSettings {
    /// Quantization steps per meter. One step is the position error bound.
    pub units_per_meter: u32,
    /// Positions must lie within `+/-position_bounds_in_meters` on each axis.
    pub position_bounds_in_meters: u32,
    /// Maximum number of bodies in a frame.
    pub max_physics_objects: u32,
    /// Largest frame number carried in a snapshot header.
    pub max_package_id: u32,
    /// Bits per quantized quaternion component (2..=10).
    pub orientation_bits: u8,
    /// Byte capacity of a single encoded snapshot.
    pub max_snapshot_bytes: usize,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            units_per_meter: 512,
            position_bounds_in_meters: 256,
            max_physics_objects: 1024,
            max_package_id: 65_535,
            orientation_bits: 9,
            max_snapshot_bytes: 16 * 1024,
        }
    }
}

impl CodecSettings {
    /// Creates settings suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            units_per_meter: 100,
            position_bounds_in_meters: 10,
            max_physics_objects: 64,
            max_package_id: 255,
            orientation_bits: 9,
            max_snapshot_bytes: 4096,
        }
    }

    /// Checks that the settings describe a usable wire format.
    pub fn validate(&self) -> CodecResult<()> {
        if self.units_per_meter == 0 {
            return Err(CodecError::InvalidSettings {
                reason: "units_per_meter must be non-zero",
            });
        }
        if self.position_bounds_in_meters == 0 {
            return Err(CodecError::InvalidSettings {
                reason: "position_bounds_in_meters must be non-zero",
            });
        }
        // Fallback deltas are zig-zag encoded and must stay within i32.
        if self.position_fallback_max_wide() > i64::from(i32::MAX) {
            return Err(CodecError::InvalidSettings {
                reason: "position range too large for 32-bit deltas",
            });
        }
        if self.max_physics_objects < 2 {
            return Err(CodecError::InvalidSettings {
                reason: "max_physics_objects must be at least 2",
            });
        }
        if self.max_package_id == 0 {
            return Err(CodecError::InvalidSettings {
                reason: "max_package_id must be non-zero",
            });
        }
        if !(MIN_QUATERNION_BITS..=MAX_QUATERNION_BITS).contains(&self.orientation_bits) {
            return Err(CodecError::InvalidQuantizationBits {
                bits: self.orientation_bits,
            });
        }
        if self.max_snapshot_bytes == 0 {
            return Err(CodecError::InvalidSettings {
                reason: "max_snapshot_bytes must be non-zero",
            });
        }
        Ok(())
    }

    /// Largest position magnitude on one axis, in quantization units.
    #[must_use]
    pub fn max_position_units(&self) -> i64 {
        i64::from(self.position_bounds_in_meters) * i64::from(self.units_per_meter)
    }

    /// Largest zig-zag encoded position delta: a full traversal of the
    /// bounded volume in either direction.
    #[must_use]
    pub fn position_fallback_max(&self) -> u32 {
        u32::try_from(self.position_fallback_max_wide()).unwrap_or(u32::MAX)
    }

    /// Largest object index.
    #[must_use]
    pub const fn max_object_index(&self) -> u32 {
        self.max_physics_objects - 1
    }

    fn position_fallback_max_wide(&self) -> i64 {
        self.max_position_units() * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        CodecSettings::default().validate().unwrap();
        CodecSettings::for_testing().validate().unwrap();
    }

    #[test]
    fn testing_settings_smaller() {
        let test = CodecSettings::for_testing();
        let default = CodecSettings::default();
        assert!(test.max_physics_objects < default.max_physics_objects);
        assert!(test.max_snapshot_bytes < default.max_snapshot_bytes);
    }

    #[test]
    fn rejects_orientation_bits() {
        for bits in [1, 11] {
            let settings = CodecSettings {
                orientation_bits: bits,
                ..CodecSettings::for_testing()
            };
            assert_eq!(
                settings.validate(),
                Err(CodecError::InvalidQuantizationBits { bits })
            );
        }
    }

    #[test]
    fn rejects_degenerate_values() {
        let cases = [
            CodecSettings {
                units_per_meter: 0,
                ..CodecSettings::for_testing()
            },
            CodecSettings {
                max_physics_objects: 1,
                ..CodecSettings::for_testing()
            },
            CodecSettings {
                max_package_id: 0,
                ..CodecSettings::for_testing()
            },
            CodecSettings {
                units_per_meter: 1 << 16,
                position_bounds_in_meters: 1 << 16,
                ..CodecSettings::for_testing()
            },
        ];
        for settings in cases {
            assert!(matches!(
                settings.validate(),
                Err(CodecError::InvalidSettings { .. })
            ));
        }
    }

    #[test]
    fn fallback_covers_full_traversal() {
        let settings = CodecSettings::for_testing();
        assert_eq!(settings.max_position_units(), 1000);
        assert_eq!(settings.position_fallback_max(), 4000);
        assert_eq!(settings.max_object_index(), 63);
    }
}
