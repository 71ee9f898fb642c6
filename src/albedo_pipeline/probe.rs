//! Light probe analysis module
//!
//! Estimates a valid-pixel mask on a gray-sphere probe capture and derives
//! green-anchored white balance coefficients from its median color.

mod mask;
mod white_balance;
mod analyzer;

pub use mask::{ProbeParams, valid_pixel_mask};
pub use white_balance::WhiteBalance;
pub use analyzer::{ProbeAnalysis, ProbeAnalyzer};
