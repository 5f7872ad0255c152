//! Error types for codec operations.

use std::fmt;

use bitstream::BitError;

use crate::types::FrameId;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during snapshot encoding/decoding.
///
/// Every error is local to a single encode/decode call; the codec never
/// retries internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bitstream error other than a capacity overrun.
    Bitstream(BitError),

    /// A range encoder was given `min >= max`.
    InvalidRange { min: u32, max: u32 },

    /// A value does not lie in `[min, max]`.
    ///
    /// Raised on write for caller-supplied values and on read for
    /// decoded values that exceed the declared maximum.
    ValueOutOfRange { value: u32, min: u32, max: u32 },

    /// Quaternion quantization bit count outside `2..=10`.
    InvalidQuantizationBits { bits: u8 },

    /// A requested frame has no recorded history.
    MissingFrame { frame: FrameId },

    /// The snapshot does not fit in the configured byte capacity.
    BufferOverflow {
        attempted_bits: usize,
        capacity_bits: usize,
    },

    /// Settings cannot describe a usable wire format.
    InvalidSettings { reason: &'static str },

    /// Frame number does not fit the header.
    FrameOutOfRange { frame: FrameId, max: u32 },

    /// Current and base frames track a different number of bodies.
    ObjectCountMismatch { expected: usize, found: usize },

    /// A decoded object index does not address a body of the base frame.
    ObjectIndexOutOfRange { index: u32, count: usize },

    /// A world position lies outside the configured bounds.
    PositionOutOfBounds { units: i64, max_units: i64 },

    /// A position component is NaN or infinite.
    NonFinitePosition,

    /// A relative orientation delta produced a component outside the
    /// quantized range.
    CorruptOrientation { component: usize, value: i64 },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::InvalidRange { min, max } => {
                write!(f, "invalid range: min {min} must be less than max {max}")
            }
            Self::ValueOutOfRange { value, min, max } => {
                write!(f, "value {value} out of range [{min}, {max}]")
            }
            Self::InvalidQuantizationBits { bits } => {
                write!(f, "quaternion bits must be in 2..=10, got {bits}")
            }
            Self::MissingFrame { frame } => {
                write!(f, "frame {} not found in history", frame.raw())
            }
            Self::BufferOverflow {
                attempted_bits,
                capacity_bits,
            } => {
                write!(
                    f,
                    "snapshot needs {attempted_bits} bits but capacity is {capacity_bits} bits"
                )
            }
            Self::InvalidSettings { reason } => write!(f, "invalid settings: {reason}"),
            Self::FrameOutOfRange { frame, max } => {
                write!(f, "frame {} exceeds maximum package id {max}", frame.raw())
            }
            Self::ObjectCountMismatch { expected, found } => {
                write!(f, "object count mismatch: expected {expected}, found {found}")
            }
            Self::ObjectIndexOutOfRange { index, count } => {
                write!(f, "object index {index} out of range for {count} objects")
            }
            Self::PositionOutOfBounds { units, max_units } => {
                write!(f, "position {units} units outside bounds of +/-{max_units}")
            }
            Self::NonFinitePosition => write!(f, "position component is not finite"),
            Self::CorruptOrientation { component, value } => {
                write!(
                    f,
                    "orientation component {component} decoded to out-of-range value {value}"
                )
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitError> for CodecError {
    fn from(e: BitError) -> Self {
        match e {
            BitError::BufferOverflow {
                attempted,
                capacity,
            } => Self::BufferOverflow {
                attempted_bits: attempted,
                capacity_bits: capacity,
            },
            other => Self::Bitstream(other),
        }
    }
}
