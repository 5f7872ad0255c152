//! MSB-first bit reader over a borrowed buffer.

use crate::error::{BitError, BitResult};
use crate::MAX_BITS;

/// Reads the fields a [`BitWriter`](crate::BitWriter) produced, in the same
/// order and widths.
///
/// Every read is checked against the remaining input, so malformed or
/// truncated buffers surface as [`BitError::UnexpectedEof`]. A failed read
/// consumes nothing.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Bits left before the end of the buffer, including zero padding.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data.len().saturating_mul(8).saturating_sub(self.cursor)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Bits consumed so far.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.cursor
    }

    pub fn read_bit(&mut self) -> BitResult<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads a `bits`-wide field (1..=32), most significant bit first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u32> {
        if bits == 0 || bits > MAX_BITS {
            return Err(BitError::InvalidBitCount {
                bits,
                max_bits: MAX_BITS,
            });
        }
        let available = self.bits_remaining();
        if usize::from(bits) > available {
            return Err(BitError::UnexpectedEof {
                requested: usize::from(bits),
                available,
            });
        }

        // Pull whole or partial bytes at a time.
        let mut value = 0u64;
        let mut left = u32::from(bits);
        while left > 0 {
            let byte = self.data[self.cursor / 8];
            let offset = (self.cursor % 8) as u32;
            let take = (8 - offset).min(left);
            let chunk = (byte >> (8 - offset - take)) & ((1u16 << take) - 1) as u8;
            value = (value << take) | u64::from(chunk);
            self.cursor += take as usize;
            left -= take;
        }
        Ok(value as u32)
    }
}
