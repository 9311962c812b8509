use crate::feature::QuantizedMultiModFeature;

/// Borrowed view over a spread quantized map: one orientation bitmask byte per pixel, row-major.
///
/// Mirrors `GrayImageView` in spirit (a borrowed, lifetime-bound slice rather than a raw pointer)
/// but carries an orientation bitmask per pixel instead of a gray level.
#[derive(Clone, Copy, Debug)]
pub struct QuantizedMap<'a> {
    pub width: usize,
    pub height: usize,
    pub bytes: &'a [u8],
}

impl<'a> QuantizedMap<'a> {
    /// Borrow a map from raw parts, panicking if `bytes.len() != width * height`.
    ///
    /// Panics (rather than returning a `Result`) because this is a programmer-error contract
    /// violation within a single process, not a boundary failure; mismatched dimensions across
    /// *modalities* passed to a single matcher call are instead reported as a
    /// `linemod_match::MatchError::DimensionMismatch` by the matcher.
    pub fn new(width: usize, height: usize, bytes: &'a [u8]) -> Self {
        assert_eq!(
            bytes.len(),
            width * height,
            "quantized map buffer length {} does not match {width}x{height}",
            bytes.len()
        );
        Self {
            width,
            height,
            bytes,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.bytes[y * self.width + x]
    }
}

/// A mask of pixels a modality's feature extractor is allowed to sample from (e.g. the object
/// silhouette within a training region).
#[derive(Clone, Copy, Debug)]
pub struct MaskMap<'a> {
    pub width: usize,
    pub height: usize,
    pub bytes: &'a [u8],
}

impl<'a> MaskMap<'a> {
    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.bytes[y * self.width + x] != 0
    }
}

/// The capability a modality front-end provides to the matching core.
///
/// Implementations are synchronous and side-effect free: `spreaded_quantized_map` returns a
/// borrowed view with a lifetime tied to `&self`, and `extract_features` appends to a
/// caller-provided buffer rather than allocating its own. Producing the quantized/spread map
/// itself (gradient extraction, normal estimation, spreading) is out of scope for this crate; see
/// `linemod-demo::SyntheticModality` for a test/demo fixture that implements this trait without
/// doing any real feature extraction.
pub trait Modality {
    /// The already-spread, quantized orientation map for the current frame.
    fn spreaded_quantized_map(&self) -> QuantizedMap<'_>;

    /// Append up to `count` features sampled from `mask`, tagged with `modality_index`.
    ///
    /// Implementations choose their own deterministic sampling order; the core does not require
    /// features to be sorted. Pushing fewer than `count` features (e.g. because the mask has
    /// fewer candidate pixels) is not an error.
    fn extract_features(
        &self,
        mask: MaskMap<'_>,
        count: usize,
        modality_index: u8,
        out: &mut Vec<QuantizedMultiModFeature>,
    );
}
