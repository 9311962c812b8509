//! The sliding-window scoring kernel (`SPEC_FULL.md` §4.3).
//!
//! For a single template, accumulates one 16-bit score per coarse grid cell by summing, for every
//! set bit of every feature, the matching linearized energy plane's offset map. A byte temporary
//! absorbs up to 64 feature contributions via [`crate::simd::byte_add`] before being flushed into
//! the 16-bit buffer, which is what keeps the hot loop inside cheap byte arithmetic instead of
//! 16-bit arithmetic throughout.

use linemod_core::{LinearizedMap, SparseMultiModTemplate};

/// Number of feature-bit contributions to accumulate in the byte temporary before flushing into
/// the 16-bit score buffer. Each contribution is at most 4, so 64 of them sum to at most 256,
/// which just barely fits a `u8` accumulator (`<=255` is required; see the overflow note below).
///
/// Note: 64 contributions of up to 4 each can sum to 256, one past `u8::MAX`. The reference uses
/// a flush cadence of "every 64 features, checked with a `> 63` counter reset", which flushes
/// *after* the 64th feature's contribution has already been added — i.e. it tolerates the
/// transient value 256 wrapping to 0 in an unsigned byte only because in practice individual
/// energy values rarely all saturate at 4 simultaneously. This reimplementation flushes strictly
/// *before* processing the 64th contribution would risk overflow, i.e. after every 63
/// contributions, which is always safe and never relies on the reference's narrow margin.
const FLUSH_INTERVAL: usize = 63;

/// Per-template coarse-grid score buffer plus the normalization factor to turn it into `[0, 1]`
/// scores.
pub struct ScoreBuffer {
    pub coarse_width: usize,
    pub coarse_height: usize,
    pub scores: Vec<u16>,
    pub max_score: u32,
}

impl ScoreBuffer {
    #[inline]
    pub fn inv_max_score(&self) -> f32 {
        if self.max_score == 0 {
            0.0
        } else {
            1.0 / self.max_score as f32
        }
    }

    #[inline]
    pub fn normalized(&self, raw: u16) -> f32 {
        raw as f32 * self.inv_max_score()
    }
}

/// Score `template` against the linearized energy planes of every modality.
///
/// `linearized[modality_index][bin]` must hold a [`LinearizedMap`] built from that modality's
/// energy plane for `bin`. `coarse_width`/`coarse_height` are shared across all modalities (the
/// matcher enforces equal input dimensions before calling this).
pub fn score_template(
    template: &SparseMultiModTemplate,
    linearized: &[Vec<LinearizedMap>],
    coarse_width: usize,
    coarse_height: usize,
) -> ScoreBuffer {
    let coarse_size = coarse_width * coarse_height;
    let mut scores = vec![0u16; coarse_size];
    let mut byte_accum = vec![0u8; coarse_size];
    let mut max_score: u32 = 0;
    let mut since_flush = 0usize;

    for feature in &template.features {
        for bin in 0..linemod_core::NUM_BINS {
            if feature.bin_mask & (1 << bin) == 0 {
                continue;
            }
            max_score += 4;

            let map = &linearized[feature.modality_index as usize][bin];
            let offset = map.offset_map(feature.x, feature.y);
            crate::simd::byte_add(&mut byte_accum[..offset.len()], offset);

            since_flush += 1;
            if since_flush >= FLUSH_INTERVAL {
                flush(&mut scores, &mut byte_accum);
                since_flush = 0;
            }
        }
    }
    flush(&mut scores, &mut byte_accum);

    ScoreBuffer {
        coarse_width,
        coarse_height,
        scores,
        max_score,
    }
}

/// Scalar reference implementation (no linearization, no SIMD): directly evaluates the scoring
/// formula pixel by pixel. `SPEC_FULL.md` §9 notes this is 10-30x slower but must be bit-for-bit
/// identical to [`score_template`]; used by this crate's tests to verify that equivalence.
#[cfg(test)]
pub fn score_template_naive(
    template: &SparseMultiModTemplate,
    energy: &[linemod_core::EnergyMaps],
    width: usize,
    height: usize,
) -> ScoreBuffer {
    let coarse_width = width / linemod_core::STEP;
    let coarse_height = height / linemod_core::STEP;
    let mut scores = vec![0u16; coarse_width * coarse_height];
    let mut max_score: u32 = 0;

    for feature in &template.features {
        for bin in 0..linemod_core::NUM_BINS {
            if feature.bin_mask & (1 << bin) == 0 {
                continue;
            }
            max_score += 4;
            let plane = energy[feature.modality_index as usize].plane(bin);
            for cy in 0..coarse_height {
                for cx in 0..coarse_width {
                    let fine_x = (cx * linemod_core::STEP) as i32 + feature.x;
                    let fine_y = (cy * linemod_core::STEP) as i32 + feature.y;
                    if fine_x < 0 || fine_y < 0 || fine_x as usize >= width || fine_y as usize >= height {
                        continue;
                    }
                    let idx = fine_y as usize * width + fine_x as usize;
                    scores[cy * coarse_width + cx] += plane[idx] as u16;
                }
            }
        }
    }

    ScoreBuffer {
        coarse_width,
        coarse_height,
        scores,
        max_score,
    }
}

fn flush(scores: &mut [u16], byte_accum: &mut [u8]) {
    for (score, byte) in scores.iter_mut().zip(byte_accum.iter_mut()) {
        *score += *byte as u16;
        *byte = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linemod_core::{EnergyMaps, QuantizedMap, QuantizedMultiModFeature, Region};

    fn checkerboard_bytes(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| if i % 3 == 0 { 0b0000_0011 } else { 0b0001_0000 })
            .collect()
    }

    fn build_energy(width: usize, height: usize) -> Vec<EnergyMaps> {
        let bytes = checkerboard_bytes(width, height);
        let map = QuantizedMap::new(width, height, &bytes);
        vec![EnergyMaps::build(map)]
    }

    fn build_linearized(energy: &[EnergyMaps], width: usize, height: usize) -> Vec<Vec<LinearizedMap>> {
        energy
            .iter()
            .map(|modality| {
                (0..linemod_core::NUM_BINS)
                    .map(|bin| LinearizedMap::build(modality.plane(bin), width, height))
                    .collect()
            })
            .collect()
    }

    fn template_with_offsets(offsets: &[(i32, i32, u8)]) -> SparseMultiModTemplate {
        SparseMultiModTemplate {
            region: Region {
                x: 0,
                y: 0,
                width: 16,
                height: 16,
            },
            features: offsets
                .iter()
                .map(|&(x, y, bin_mask)| QuantizedMultiModFeature {
                    modality_index: 0,
                    x,
                    y,
                    bin_mask,
                })
                .collect(),
        }
    }

    #[test]
    fn linearized_scoring_matches_naive_reference() {
        let (width, height) = (32, 24);
        let energy = build_energy(width, height);
        let linearized = build_linearized(&energy, width, height);
        let (coarse_width, coarse_height) = (width / linemod_core::STEP, height / linemod_core::STEP);

        let template = template_with_offsets(&[
            (0, 0, 0b0000_0001),
            (3, 5, 0b0001_0001),
            (15, 11, 0b1111_1111),
            (31, 23, 0b0000_0010),
        ]);

        let fast = score_template(&template, &linearized, coarse_width, coarse_height);
        let naive = score_template_naive(&template, &energy, width, height);

        assert_eq!(fast.scores, naive.scores);
        assert_eq!(fast.max_score, naive.max_score);
    }

    #[test]
    fn feature_offset_past_the_plane_contributes_nothing_but_does_not_panic() {
        let (width, height) = (16, 16);
        let energy = build_energy(width, height);
        let linearized = build_linearized(&energy, width, height);
        let (coarse_width, coarse_height) = (width / linemod_core::STEP, height / linemod_core::STEP);

        let template = template_with_offsets(&[(1000, 1000, 0b1111_1111)]);

        let fast = score_template(&template, &linearized, coarse_width, coarse_height);
        assert!(fast.scores.iter().all(|&s| s == 0));
    }
}
