//! Bit packing for the bodysync transform codec.
//!
//! [`BitWriter`] appends fixed-width fields MSB-first; [`BitReader`] reads
//! them back in the same order. Field widths are chosen by the caller, so a
//! buffer is only meaningful to a reader that replays the writer's widths.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - Reads are bounds-checked; writers may be capped.
//! - **No domain knowledge** - Bodies, frames and quantization live in `codec`.
//! - **Explicit errors** - Malformed input is a [`BitError`], never a panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true).unwrap();
//! writer.write_bits(300, 9).unwrap();
//! let bytes = writer.finish();
//! assert_eq!(bytes.len(), 2);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(9).unwrap(), 300);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;

/// Widest field a single `write_bits`/`read_bits` call accepts.
pub const MAX_BITS: u8 = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_written_is_empty() {
        let bytes = BitWriter::new().finish();
        assert!(bytes.is_empty());
        assert!(BitReader::new(&bytes).is_empty());
    }

    #[test]
    fn every_width_roundtrips() {
        for bits in 1..=MAX_BITS {
            let value = if bits == 32 {
                0xDEAD_BEEF
            } else {
                0xDEAD_BEEF & ((1u32 << bits) - 1)
            };
            let mut writer = BitWriter::new();
            writer.write_bit(true).unwrap();
            writer.write_bits(value, bits).unwrap();
            let bytes = writer.finish();

            let mut reader = BitReader::new(&bytes);
            assert!(reader.read_bit().unwrap());
            assert_eq!(reader.read_bits(bits).unwrap(), value, "{bits}-bit field");
        }
    }

    #[test]
    fn header_like_sequence() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xBEEF, 16).unwrap();
        writer.write_bits(5, 7).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_bits(0b10, 2).unwrap();
        assert_eq!(writer.bits_written(), 26);
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0xBE, 0xEF, 0b0000_1010, 0b1000_0000]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(16).unwrap(), 0xBEEF);
        assert_eq!(reader.read_bits(7).unwrap(), 5);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
        assert_eq!(reader.bits_remaining(), 6);
    }
}
