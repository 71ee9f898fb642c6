//! Scale alignment of albedo estimates.
//!
//! Each direction's estimate carries an arbitrary overall brightness. A single
//! least-squares scalar brings it onto the reference estimate's scale without
//! touching relative pixel values.

use image::Rgb32FImage;

use crate::albedo_pipeline::common::{Result, check_same_dimensions};

/// Best non-negative `k` minimizing `|k * estimate - reference|²`.
///
/// An all-zero estimate has no defined scale and returns 1.0.
pub fn scale_factor(estimate: &Rgb32FImage, reference: &Rgb32FImage) -> Result<f32> {
    check_same_dimensions(reference.dimensions(), estimate.dimensions())?;

    let (cross, energy) = estimate
        .iter()
        .zip(reference.iter())
        .fold((0.0f64, 0.0f64), |(cross, energy), (&a, &r)| {
            (cross + a as f64 * r as f64, energy + a as f64 * a as f64)
        });

    if energy == 0.0 {
        return Ok(1.0);
    }

    Ok((cross / energy).max(0.0) as f32)
}

/// Rescales `estimate` onto the brightness scale of `reference`.
///
/// Returns the aligned image and the scale that was applied.
pub fn match_scale(estimate: &Rgb32FImage, reference: &Rgb32FImage) -> Result<(Rgb32FImage, f32)> {
    let k = scale_factor(estimate, reference)?;

    let mut aligned = estimate.clone();
    for value in aligned.iter_mut() {
        *value *= k;
    }
    Ok((aligned, k))
}
