//! Synthetic test/demo fixture for the LINE-MOD matching kernel.
//!
//! [`SyntheticModality`] is a [`linemod_core::Modality`] backed by a precomputed quantized map; it
//! exists to exercise [`linemod_match::Matcher`] end to end in tests and in the `linemod-demo`
//! binary without a real gradient/normal feature extractor, which is out of scope for this
//! workspace (see `linemod-core`'s crate documentation).

mod synthetic;

pub use synthetic::SyntheticModality;
