use crate::modality::QuantizedMap;

/// Number of orientation bins per modality (fixed by the quantized-map wire format: one bit per
/// bin in an 8-bit byte).
pub const NUM_BINS: usize = 8;

/// `B = NUM_BINS` dense energy planes of `width * height` bytes, each byte in `0..=4`.
///
/// Plane `b`, pixel `p`, equals the number of the four bit-pattern tests from
/// `energy_bit_patterns(b)` that hit a set bit in the spread quantized byte at `p`. See
/// `SPEC_FULL.md` §4.1 for the derivation; this approximates `|cos(Δθ)|` between the feature's
/// canonical bin and whatever bins are present (via spreading) at `p`, quantized to one of four
/// levels.
#[derive(Clone, Debug)]
pub struct EnergyMaps {
    pub width: usize,
    pub height: usize,
    planes: Vec<Vec<u8>>,
}

/// The four nested bit-pattern tests for orientation bin `b`.
///
/// `patterns[k]` (`k` in `0..4`) ORs in the two bins `k` steps away from `b` on either side,
/// approximating angular distances of 0, ±22.5, ±45, ±67.5 degrees. Must use the modular-shift
/// `(b + k) % 8` form; the `(b + k) & 7` variant found alongside this one in the historical
/// reference applies the mask before the shift and silently zeroes most of the shift amount for
/// `k > 0`.
fn energy_bit_patterns(b: usize) -> [u8; 4] {
    let bit = |i: usize| 1u8 << (i % NUM_BINS);
    let v0 = bit(b);
    let v1 = v0 | bit(b + 1) | bit(b + NUM_BINS - 1);
    let v2 = v1 | bit(b + 2) | bit(b + NUM_BINS - 2);
    let v3 = v2 | bit(b + 3) | bit(b + NUM_BINS - 3);
    [v0, v1, v2, v3]
}

impl EnergyMaps {
    /// Build all `NUM_BINS` energy planes from a spread quantized map.
    pub fn build(map: QuantizedMap<'_>) -> Self {
        let size = map.width * map.height;
        let mut planes = Vec::with_capacity(NUM_BINS);
        for b in 0..NUM_BINS {
            let patterns = energy_bit_patterns(b);
            let mut plane = vec![0u8; size];
            for (dst, &byte) in plane.iter_mut().zip(map.bytes.iter()) {
                let mut energy = 0u8;
                for &pattern in &patterns {
                    if pattern & byte != 0 {
                        energy += 1;
                    }
                }
                *dst = energy;
            }
            planes.push(plane);
        }
        Self {
            width: map.width,
            height: map.height,
            planes,
        }
    }

    #[inline]
    pub fn plane(&self, bin: usize) -> &[u8] {
        &self.planes[bin]
    }
}
