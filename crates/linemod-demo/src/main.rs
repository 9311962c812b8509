use std::time::Instant;

use linemod_core::Region;
use linemod_demo::SyntheticModality;
use linemod_match::{Matcher, MatcherConfig};

#[cfg(feature = "tracing")]
use linemod_core::logger::init_tracing;

const WIDTH: usize = 64;
const HEIGHT: usize = 64;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    linemod_core::logger::init_with_level(log::LevelFilter::Info)?;

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => demo_default_config(),
    };

    let modality = build_synthetic_scene();
    let mut matcher = Matcher::new(config);
    matcher.add_template(build_template());

    let started = Instant::now();
    let matched = matcher.match_templates(&[&modality])?;
    log::info!("match_templates took {:?}", started.elapsed());
    for detection in &matched {
        println!(
            "match: template={} x={} y={} score={:.3}",
            detection.template_id, detection.x, detection.y, detection.score
        );
    }

    let started = Instant::now();
    let detections = matcher.detect_templates(&[&modality])?;
    log::info!("detect_templates took {:?}", started.elapsed());
    for detection in &detections {
        println!(
            "detect: template={} x={} y={} score={:.3}",
            detection.template_id, detection.x, detection.y, detection.score
        );
    }

    Ok(())
}

/// A 64x64 scene with a single exact-bin pixel at (24, 24), matching `build_template`'s single
/// feature exactly.
fn build_synthetic_scene() -> SyntheticModality {
    let mut modality = SyntheticModality::blank(WIDTH, HEIGHT);
    modality.set(24, 24, 0b0000_0001);
    modality
}

fn build_template() -> linemod_core::SparseMultiModTemplate {
    linemod_core::SparseMultiModTemplate {
        region: Region { x: 0, y: 0, width: 8, height: 8 },
        features: vec![linemod_core::QuantizedMultiModFeature {
            modality_index: 0,
            x: 0,
            y: 0,
            bin_mask: 0b0000_0001,
        }],
    }
}

/// Same as [`MatcherConfig::default`] but with NMS and averaging on, so the demo's
/// `detect_templates` call exercises both without requiring a `--config` file.
fn demo_default_config() -> MatcherConfig {
    MatcherConfig {
        template_threshold: 0.5,
        use_non_max_suppression: true,
        average_detections: true,
    }
}

/// Load a [`MatcherConfig`] from a JSON file, mirroring how the matcher's knobs round-trip through
/// the teacher's `*Params`/`*Config` JSON configuration files.
fn load_config(path: &str) -> Result<MatcherConfig, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
