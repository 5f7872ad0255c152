//! Smallest-three quaternion compression.
//!
//! The component with the largest magnitude is dropped and replaced by its
//! 2-bit index; the other three lie in `[-1/sqrt(2), 1/sqrt(2)]` and are
//! quantized to `bits` each. Reconstruction always takes the non-negative
//! root for the dropped component, so a decoded quaternion may be the
//! negation of the input. Both describe the same rotation.

use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{CodecError, CodecResult};
use crate::types::Quat;

pub const MIN_QUATERNION_BITS: u8 = 2;
pub const MAX_QUATERNION_BITS: u8 = 10;

const COMPONENT_MIN: f64 = -FRAC_1_SQRT_2;
const COMPONENT_MAX: f64 = FRAC_1_SQRT_2;

/// A quantized quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressedQuaternion {
    /// Index (x=0, y=1, z=2, w=3) of the dropped component.
    pub largest: u8,
    /// The three remaining components, in `x, y, z, w` order.
    pub components: [u32; 3],
}

/// Quantizes and reconstructs quaternions at a fixed bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuaternionCompressor {
    bits: u8,
    max_value: u32,
}

impl QuaternionCompressor {
    /// Creates a compressor for `bits` per component.
    pub const fn new(bits: u8) -> CodecResult<Self> {
        if bits < MIN_QUATERNION_BITS || bits > MAX_QUATERNION_BITS {
            return Err(CodecError::InvalidQuantizationBits { bits });
        }
        Ok(Self {
            bits,
            max_value: (1 << bits) - 1,
        })
    }

    /// Bits per quantized component.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Largest quantized component value.
    #[must_use]
    pub const fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Quantizes a normalized quaternion.
    ///
    /// On equal magnitudes the earlier component is treated as largest.
    #[must_use]
    pub fn compress(&self, q: Quat) -> CompressedQuaternion {
        let values = q.to_array();
        let mut largest = 0;
        for i in 1..4 {
            if values[i].abs() > values[largest].abs() {
                largest = i;
            }
        }

        // q and -q are the same rotation; keep the dropped component positive.
        let sign = if values[largest] >= 0.0 { 1.0 } else { -1.0 };
        let mut components = [0u32; 3];
        for (slot, value) in components.iter_mut().zip(others(&values, largest)) {
            *slot = self.quantize(value * sign);
        }

        CompressedQuaternion {
            largest: largest as u8,
            components,
        }
    }

    /// Reconstructs a unit quaternion from its quantized form.
    #[must_use]
    pub fn decompress(&self, compressed: CompressedQuaternion) -> Quat {
        let [a, b, c] = compressed.components.map(|v| self.dequantize(v));
        let dropped = (1.0 - a * a - b * b - c * c).max(0.0).sqrt();

        let largest = usize::from(compressed.largest.min(3));
        let mut remaining = [a, b, c].into_iter();
        let mut values = [0.0; 4];
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = if i == largest {
                dropped
            } else {
                remaining.next().unwrap_or(0.0)
            };
        }
        Quat::from_array(values)
    }

    fn quantize(&self, value: f64) -> u32 {
        let scale = f64::from(self.max_value);
        let normalized = (value - COMPONENT_MIN) / (COMPONENT_MAX - COMPONENT_MIN);
        (normalized * scale + 0.5).floor().clamp(0.0, scale) as u32
    }

    fn dequantize(&self, value: u32) -> f64 {
        let inverse_scale = 1.0 / f64::from(self.max_value);
        f64::from(value) * inverse_scale * (COMPONENT_MAX - COMPONENT_MIN) + COMPONENT_MIN
    }
}

fn others(values: &[f64; 4], skip: usize) -> impl Iterator<Item = f64> + '_ {
    values
        .iter()
        .enumerate()
        .filter(move |(i, _)| *i != skip)
        .map(|(_, v)| *v)
}
