use crate::feature::{Region, SparseMultiModTemplate};
use crate::modality::{MaskMap, Modality};

/// Default number of features requested per modality in `create_and_add_template`, matching the
/// historical reference (`SPEC_FULL.md` §4.4).
pub const DEFAULT_FEATURES_PER_MODALITY: usize = 63;

/// Append-only ordered catalog of templates. Indices are stable identities: templates are never
/// modified or removed once added.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: Vec<SparseMultiModTemplate>,
    features_per_modality: usize,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            features_per_modality: DEFAULT_FEATURES_PER_MODALITY,
        }
    }

    /// Override the number of features requested per modality in `create_and_add_template`.
    ///
    /// Exposed as a welcome extension over the hard-coded reference value of 63; does not affect
    /// `add_template`.
    pub fn with_features_per_modality(mut self, count: usize) -> Self {
        self.features_per_modality = count;
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SparseMultiModTemplate> {
        self.templates.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SparseMultiModTemplate> {
        self.templates.iter()
    }

    /// Append a pre-built template, returning its index.
    pub fn add_template(&mut self, template: SparseMultiModTemplate) -> usize {
        self.templates.push(template);
        self.templates.len() - 1
    }

    /// Sample features from every modality within `region`/`masks`, translate them to be
    /// region-relative, and append the resulting template. Returns its index.
    ///
    /// `modalities` and `masks` must have the same length; each `masks[i]` is the sampling mask
    /// for `modalities[i]`.
    pub fn create_and_add_template(
        &mut self,
        modalities: &[&dyn Modality],
        masks: &[MaskMap<'_>],
        region: Region,
    ) -> usize {
        assert_eq!(
            modalities.len(),
            masks.len(),
            "one mask is required per modality"
        );

        let mut features = Vec::new();
        for (modality_index, (modality, mask)) in modalities.iter().zip(masks).enumerate() {
            modality.extract_features(
                *mask,
                self.features_per_modality,
                modality_index as u8,
                &mut features,
            );
        }

        for feature in &mut features {
            feature.x -= region.x;
            feature.y -= region.y;
        }

        let template = SparseMultiModTemplate {
            region: Region {
                x: 0,
                y: 0,
                width: region.width,
                height: region.height,
            },
            features,
        };

        self.add_template(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::QuantizedMultiModFeature;
    use crate::modality::QuantizedMap;

    struct FixedFeatureModality {
        features: Vec<QuantizedMultiModFeature>,
    }

    impl Modality for FixedFeatureModality {
        fn spreaded_quantized_map(&self) -> QuantizedMap<'_> {
            QuantizedMap::new(1, 1, &[0])
        }

        fn extract_features(
            &self,
            _mask: MaskMap<'_>,
            count: usize,
            modality_index: u8,
            out: &mut Vec<QuantizedMultiModFeature>,
        ) {
            for feature in self.features.iter().take(count) {
                out.push(QuantizedMultiModFeature {
                    modality_index,
                    ..*feature
                });
            }
        }
    }

    #[test]
    fn create_and_add_template_translates_to_region_origin() {
        let modality = FixedFeatureModality {
            features: vec![QuantizedMultiModFeature {
                modality_index: 0,
                x: 15,
                y: 20,
                bin_mask: 0b0000_0001,
            }],
        };
        let mask_bytes = [1u8];
        let mask = MaskMap {
            width: 1,
            height: 1,
            bytes: &mask_bytes,
        };

        let mut store = TemplateStore::new();
        let region = Region {
            x: 10,
            y: 10,
            width: 20,
            height: 20,
        };
        let idx = store.create_and_add_template(&[&modality], &[mask], region);

        let template = store.get(idx).unwrap();
        assert_eq!(template.region, Region { x: 0, y: 0, width: 20, height: 20 });
        assert_eq!(template.features.len(), 1);
        assert_eq!(template.features[0].x, 5);
        assert_eq!(template.features[0].y, 10);
    }

    #[test]
    fn add_template_returns_stable_index() {
        let mut store = TemplateStore::new();
        let a = store.add_template(SparseMultiModTemplate::default());
        let b = store.add_template(SparseMultiModTemplate::default());
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(store.len(), 2);
    }
}
