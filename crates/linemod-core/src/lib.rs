//! Data model, energy maps, linearization, template storage, and persistence for the LINE-MOD
//! matching kernel.
//!
//! This crate is intentionally algorithm-focused and does *not* implement any modality front-end
//! (gradient extraction, normal estimation, spreading) — see [`Modality`] for the boundary those
//! front-ends are expected to satisfy, and the `linemod-demo` crate for a synthetic test fixture.

mod energy;
mod error;
mod feature;
mod linearize;
pub mod logger;
mod modality;
mod template_store;

pub mod persistence;

pub use energy::{EnergyMaps, NUM_BINS};
pub use error::PersistError;
pub use feature::{QuantizedMultiModFeature, Region, SparseMultiModTemplate};
pub use linearize::{LinearizedMap, STEP};
pub use modality::{MaskMap, Modality, QuantizedMap};
pub use template_store::{TemplateStore, DEFAULT_FEATURES_PER_MODALITY};
