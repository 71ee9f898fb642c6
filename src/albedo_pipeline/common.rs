//! Common utilities module
//!
//! This module contains shared utilities used across the albedo pipeline.

pub mod error;
pub mod stats;

pub use error::{AlbedoError, Result};
pub use stats::{check_same_dimensions, median_in_place, percentile_in_place};
