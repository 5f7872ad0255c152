//! MSB-first bit writer backed by a growable buffer.

use crate::error::{BitError, BitResult};
use crate::MAX_BITS;

/// Packs fields of 1 to 32 bits into bytes, most significant bit first.
///
/// The buffer grows on demand. A writer built with
/// [`with_limit`](Self::with_limit) rejects any write that would take it past
/// the limit and stays unchanged when it does.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    /// Bits already used in the last byte of `bytes` (0 means byte aligned).
    tail_bits: u8,
    limit_bits: Option<usize>,
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unbounded writer with `bytes` preallocated.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Writer capped at `bytes` bytes of output.
    #[must_use]
    pub fn with_limit(bytes: usize) -> Self {
        Self {
            limit_bits: Some(bytes.saturating_mul(8)),
            ..Self::with_capacity(bytes)
        }
    }

    #[must_use]
    pub fn bits_written(&self) -> usize {
        match self.tail_bits {
            0 => self.bytes.len() * 8,
            used => (self.bytes.len() - 1) * 8 + usize::from(used),
        }
    }

    #[must_use]
    pub const fn limit_bits(&self) -> Option<usize> {
        self.limit_bits
    }

    pub fn write_bit(&mut self, value: bool) -> BitResult<()> {
        self.write_bits(u32::from(value), 1)
    }

    /// Appends the low `bits` bits of `value`.
    ///
    /// # Errors
    ///
    /// [`BitError::InvalidBitCount`] for widths outside `1..=32`,
    /// [`BitError::ValueOutOfRange`] when `value` is wider than `bits`, and
    /// [`BitError::BufferOverflow`] when a bounded writer is full.
    pub fn write_bits(&mut self, value: u32, bits: u8) -> BitResult<()> {
        if bits == 0 || bits > MAX_BITS {
            return Err(BitError::InvalidBitCount {
                bits,
                max_bits: MAX_BITS,
            });
        }
        if bits < MAX_BITS && value >> bits != 0 {
            return Err(BitError::ValueOutOfRange { value, bits });
        }
        if let Some(capacity) = self.limit_bits {
            let attempted = self.bits_written() + usize::from(bits);
            if attempted > capacity {
                return Err(BitError::BufferOverflow {
                    attempted,
                    capacity,
                });
            }
        }

        let mut left = u32::from(bits);
        while left > 0 {
            if self.tail_bits == 0 {
                self.bytes.push(0);
            }
            let free = 8 - u32::from(self.tail_bits);
            let take = free.min(left);
            let chunk = ((value >> (left - take)) & ((1 << take) - 1)) as u8;
            if let Some(last) = self.bytes.last_mut() {
                *last |= chunk << (free - take);
            }
            self.tail_bits = ((u32::from(self.tail_bits) + take) % 8) as u8;
            left -= take;
        }
        Ok(())
    }

    /// Returns the packed bytes; the final partial byte is zero padded.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.shrink_to_fit();
        self.bytes
    }
}
