use serde::{Deserialize, Serialize};

/// A single sparse, quantized, multi-modal feature.
///
/// `bin_mask` is a bitmask over the 8 orientation bins of the owning modality. Features produced
/// by [`crate::TemplateStore::create_and_add_template`] always carry exactly one set bit (the
/// canonical form the fast scoring path requires); features read back from a foreign template
/// stream are not
/// re-validated against that invariant, since the scoring kernel tolerates multi-bit masks (it
/// simply scores every set bit), it is only `create_and_add_template` that guarantees the
/// single-bit form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantizedMultiModFeature {
    pub modality_index: u8,
    pub x: i32,
    pub y: i32,
    pub bin_mask: u8,
}

/// Axis-aligned region a template was cut from, in the coordinate system its features are
/// relative to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A sparse multi-modal template: an ordered set of features plus the region they were sampled
/// from. Feature coordinates are relative to `region.(x, y)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMultiModTemplate {
    pub region: Region,
    pub features: Vec<QuantizedMultiModFeature>,
}

impl SparseMultiModTemplate {
    /// Sum of `popcount(bin_mask)` over every feature, i.e. the number of individual bit-tests
    /// the scoring kernel will perform for this template.
    pub fn bit_count(&self) -> u32 {
        self.features
            .iter()
            .map(|f| f.bin_mask.count_ones())
            .sum()
    }
}
