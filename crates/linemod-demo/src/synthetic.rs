//! A [`Modality`] fixture for tests, doctests, and the demo binary.
//!
//! This is explicitly **not** a feature extractor implementation: gradient/normal estimation and
//! spreading are out of scope for the matching core (see `linemod-core`'s crate documentation).
//! `SyntheticModality` just wraps a precomputed spread quantized map and samples features from it
//! in the simplest possible deterministic way, so the matcher can be exercised end to end.

use linemod_core::{MaskMap, Modality, QuantizedMap, QuantizedMultiModFeature};

/// Wraps an already-spread quantized map (one orientation bitmask byte per pixel).
#[derive(Clone, Debug)]
pub struct SyntheticModality {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

impl SyntheticModality {
    /// `bytes` must have length `width * height`.
    pub fn new(width: usize, height: usize, bytes: Vec<u8>) -> Self {
        assert_eq!(bytes.len(), width * height, "buffer length must match width*height");
        Self { width, height, bytes }
    }

    /// A blank map (every pixel's bitmask is zero) of the given size.
    pub fn blank(width: usize, height: usize) -> Self {
        Self::new(width, height, vec![0u8; width * height])
    }

    /// Set the orientation bitmask at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, bin_mask: u8) {
        self.bytes[y * self.width + x] = bin_mask;
    }
}

impl Modality for SyntheticModality {
    fn spreaded_quantized_map(&self) -> QuantizedMap<'_> {
        QuantizedMap::new(self.width, self.height, &self.bytes)
    }

    /// Walks `mask` in row-major order and takes the first `count` pixels with a nonzero
    /// quantized byte, tagging each feature with the lowest set bit of that byte (the single-bit
    /// canonical form the fast scoring path assumes).
    fn extract_features(
        &self,
        mask: MaskMap<'_>,
        count: usize,
        modality_index: u8,
        out: &mut Vec<QuantizedMultiModFeature>,
    ) {
        let mut taken = 0usize;
        for y in 0..mask.height {
            if taken >= count {
                break;
            }
            for x in 0..mask.width {
                if taken >= count {
                    break;
                }
                if !mask.is_set(x, y) {
                    continue;
                }
                let byte = self.bytes[y * self.width + x];
                if byte == 0 {
                    continue;
                }
                out.push(QuantizedMultiModFeature {
                    modality_index,
                    x: x as i32,
                    y: y as i32,
                    bin_mask: byte & byte.wrapping_neg(),
                });
                taken += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mask(width: usize, height: usize) -> (Vec<u8>, usize, usize) {
        (vec![1u8; width * height], width, height)
    }

    #[test]
    fn extracts_up_to_count_features_in_row_major_order() {
        let mut modality = SyntheticModality::blank(4, 2);
        modality.set(1, 0, 0b0000_0001);
        modality.set(3, 0, 0b0000_0100);
        modality.set(2, 1, 0b0001_0000);

        let (bytes, width, height) = full_mask(4, 2);
        let mask = MaskMap { width, height, bytes: &bytes };

        let mut out = Vec::new();
        modality.extract_features(mask, 2, 0, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!((out[0].x, out[0].y, out[0].bin_mask), (1, 0, 0b0000_0001));
        assert_eq!((out[1].x, out[1].y, out[1].bin_mask), (3, 0, 0b0000_0100));
    }

    #[test]
    fn reduces_multi_bit_bytes_to_their_lowest_set_bit() {
        let mut modality = SyntheticModality::blank(1, 1);
        modality.set(0, 0, 0b0010_0100);

        let (bytes, width, height) = full_mask(1, 1);
        let mask = MaskMap { width, height, bytes: &bytes };

        let mut out = Vec::new();
        modality.extract_features(mask, 1, 0, &mut out);

        assert_eq!(out[0].bin_mask, 0b0000_0100);
    }

    #[test]
    fn skips_pixels_outside_the_mask_and_zero_pixels() {
        let mut modality = SyntheticModality::blank(3, 1);
        modality.set(0, 0, 0b0000_0001);
        modality.set(1, 0, 0b0000_0001);
        modality.set(2, 0, 0b0000_0001);

        let mask = MaskMap { width: 3, height: 1, bytes: &[1, 0, 1] };

        let mut out = Vec::new();
        modality.extract_features(mask, 10, 0, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].x, 0);
        assert_eq!(out[1].x, 2);
    }
}
