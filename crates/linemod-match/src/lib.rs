//! Sliding-window scoring, non-maximum suppression, and averaging for the LINE-MOD matching
//! kernel, built on top of the data model and linearized maps in `linemod-core`.
//!
//! The public surface is [`Matcher`]: it owns a template catalog and scores it against a set of
//! [`linemod_core::Modality`] implementations via [`Matcher::match_templates`] (one best detection
//! per template) or [`Matcher::detect_templates`] (every cell above a threshold, with optional NMS
//! and averaging).

mod error;
mod kernel;
mod matcher;
mod nms;
pub mod simd;

pub use error::MatchError;
pub use kernel::ScoreBuffer;
pub use matcher::{Detection, Matcher, MatcherConfig};
pub use nms::{is_local_max, weighted_center};
