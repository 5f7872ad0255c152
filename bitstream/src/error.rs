//! Failures raised by [`BitWriter`](crate::BitWriter) and
//! [`BitReader`](crate::BitReader).

use std::fmt;

pub type BitResult<T> = Result<T, BitError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// The reader ran out of input.
    UnexpectedEof { requested: usize, available: usize },

    /// A bounded writer would have grown past its limit. Both counts are in
    /// bits; `attempted` is the total after the rejected write.
    BufferOverflow { attempted: usize, capacity: usize },

    /// Field width outside `1..=max_bits`.
    InvalidBitCount { bits: u8, max_bits: u8 },

    /// `value` has bits set above the field width.
    ValueOutOfRange { value: u32, bits: u8 },
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => write!(
                f,
                "truncated input: needed {requested} bits to read, {available} bits left"
            ),
            Self::BufferOverflow {
                attempted,
                capacity,
            } => write!(
                f,
                "write overflows buffer: {attempted} bits exceeds limit of {capacity} bits"
            ),
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "field width {bits} outside 1..={max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} does not fit a {bits}-bit field")
            }
        }
    }
}

impl std::error::Error for BitError {}
