//! Exposure normalization module
//!
//! Applies probe-derived white balance to a directional capture and maps it
//! into display range with a global auto-exposure scale.

mod tonemap;
mod normalizer;

pub use tonemap::{TonemapParams, tonemap_scale};
pub use normalizer::{ExposureNormalizer, NormalizedCapture};
