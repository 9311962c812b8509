use serde::{Deserialize, Serialize};

use linemod_core::{
    EnergyMaps, LinearizedMap, MaskMap, Modality, QuantizedMap, Region, SparseMultiModTemplate,
    TemplateStore, STEP,
};

use crate::error::MatchError;
use crate::kernel::{score_template, ScoreBuffer};
use crate::nms::{is_local_max, weighted_center};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A single reported template position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub template_id: usize,
    pub x: i32,
    pub y: i32,
    pub score: f32,
}

/// Matcher tuning knobs. Serializable so it can round-trip through JSON, mirroring the teacher's
/// `*Params` configuration types.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Threshold `τ ∈ [0, 1]` used by `detect_templates`. Mapped into the raw score domain as
    /// `raw_threshold = max_score/2 + τ · max_score/2` — note `τ = 0` already accepts any cell
    /// scoring at least half of `max_score`, a surprising but preserved historical contract.
    pub template_threshold: f32,
    /// Suppress a coarse cell in `detect_templates` if any of its 3×3 neighbors strictly exceeds
    /// it.
    pub use_non_max_suppression: bool,
    /// Replace the reported coordinate with the score-weighted center of mass of the surviving
    /// cell's 3×3 neighborhood.
    pub average_detections: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            template_threshold: 0.75,
            use_non_max_suppression: false,
            average_detections: false,
        }
    }
}

/// Holds a template catalog and scores it against modality input.
#[derive(Debug)]
pub struct Matcher {
    templates: TemplateStore,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            templates: TemplateStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn set_template_threshold(&mut self, threshold: f32) {
        self.config.template_threshold = threshold;
    }

    pub fn set_use_nms(&mut self, use_nms: bool) {
        self.config.use_non_max_suppression = use_nms;
    }

    pub fn set_average_detections(&mut self, average: bool) {
        self.config.average_detections = average;
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn template(&self, index: usize) -> Option<&SparseMultiModTemplate> {
        self.templates.get(index)
    }

    pub fn add_template(&mut self, template: SparseMultiModTemplate) -> usize {
        self.templates.add_template(template)
    }

    pub fn create_and_add_template(
        &mut self,
        modalities: &[&dyn Modality],
        masks: &[MaskMap<'_>],
        region: Region,
    ) -> usize {
        self.templates.create_and_add_template(modalities, masks, region)
    }

    pub fn save_templates(&self, path: impl AsRef<std::path::Path>) -> Result<(), linemod_core::PersistError> {
        let catalog: Vec<SparseMultiModTemplate> = self.templates.iter().cloned().collect();
        linemod_core::persistence::save_templates(&catalog, path)
    }

    pub fn load_templates(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), linemod_core::PersistError> {
        let catalog = linemod_core::persistence::load_templates(path)?;
        for template in catalog {
            self.templates.add_template(template);
        }
        Ok(())
    }

    /// One best-position detection per template, no thresholding. Output order matches template
    /// order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, modalities), fields(templates = self.templates.len()))
    )]
    pub fn match_templates(&self, modalities: &[&dyn Modality]) -> Result<Vec<Detection>, MatchError> {
        let scan = self.score_all(modalities)?;

        let mut detections = Vec::with_capacity(self.templates.len());
        for (template_id, buffer) in scan.buffers.iter().enumerate() {
            let inv_max = buffer.inv_max_score();
            let (cx, cy, raw) = argmax(buffer);
            detections.push(Detection {
                template_id,
                x: (cx * STEP) as i32,
                y: (cy * STEP) as i32,
                score: raw as f32 * inv_max,
            });
        }
        Ok(detections)
    }

    /// Every coarse cell exceeding the configured threshold, per template, in row-major order
    /// within a template. Output is sorted `(template_id asc, coarse_row asc, coarse_col asc)`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, modalities), fields(templates = self.templates.len()))
    )]
    pub fn detect_templates(&self, modalities: &[&dyn Modality]) -> Result<Vec<Detection>, MatchError> {
        let scan = self.score_all(modalities)?;

        let mut detections = Vec::new();
        for (template_id, buffer) in scan.buffers.iter().enumerate() {
            let inv_max = buffer.inv_max_score();
            let raw_threshold = scan_threshold(buffer.max_score, self.config.template_threshold);

            for cy in 0..buffer.coarse_height {
                for cx in 0..buffer.coarse_width {
                    let raw = buffer.scores[cy * buffer.coarse_width + cx];
                    if raw as f32 <= raw_threshold {
                        continue;
                    }
                    if self.config.use_non_max_suppression && !is_local_max(buffer, cx, cy) {
                        continue;
                    }

                    let (x, y) = if self.config.average_detections {
                        weighted_center(buffer, cx, cy, STEP)
                    } else {
                        ((cx * STEP) as i32, (cy * STEP) as i32)
                    };

                    detections.push(Detection {
                        template_id,
                        x,
                        y,
                        score: raw as f32 * inv_max,
                    });
                }
            }
        }
        Ok(detections)
    }

    fn score_all(&self, modalities: &[&dyn Modality]) -> Result<Scan, MatchError> {
        if modalities.is_empty() {
            return Err(MatchError::EmptyInput);
        }
        if self.templates.is_empty() {
            return Err(MatchError::NoTemplates);
        }

        let maps: Vec<QuantizedMap<'_>> = modalities.iter().map(|m| m.spreaded_quantized_map()).collect();
        let (width, height) = (maps[0].width, maps[0].height);
        for (index, map) in maps.iter().enumerate().skip(1) {
            if map.width != width || map.height != height {
                return Err(MatchError::DimensionMismatch {
                    index,
                    width: map.width,
                    height: map.height,
                    expected_width: width,
                    expected_height: height,
                });
            }
        }

        let linearized: Vec<Vec<LinearizedMap>> = maps
            .iter()
            .map(|map| {
                let energy = EnergyMaps::build(*map);
                (0..linemod_core::NUM_BINS)
                    .map(|bin| LinearizedMap::build(energy.plane(bin), width, height))
                    .collect()
            })
            .collect();

        let coarse_width = width / STEP;
        let coarse_height = height / STEP;
        let buffers: Vec<ScoreBuffer> = self
            .templates
            .iter()
            .map(|template| score_template(template, &linearized, coarse_width, coarse_height))
            .collect();

        Ok(Scan { buffers })
    }
}

struct Scan {
    buffers: Vec<ScoreBuffer>,
}

/// `raw_threshold = max_score/2 + τ · max_score/2`, preserved verbatim from the historical
/// reference (see [`MatcherConfig::template_threshold`]).
fn scan_threshold(max_score: u32, tau: f32) -> f32 {
    let max_score = max_score as f32;
    max_score / 2.0 + tau * max_score / 2.0
}

/// Coarse cell of the maximum score, first occurrence wins on ties.
fn argmax(buffer: &ScoreBuffer) -> (usize, usize, u16) {
    let mut best = (0usize, 0usize, 0u16);
    let mut found = false;
    for cy in 0..buffer.coarse_height {
        for cx in 0..buffer.coarse_width {
            let raw = buffer.scores[cy * buffer.coarse_width + cx];
            if !found || raw > best.2 {
                best = (cx, cy, raw);
                found = true;
            }
        }
    }
    best
}
