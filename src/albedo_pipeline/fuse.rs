//! Robust fusion of aligned albedo estimates via the per-pixel median.

use image::Rgb32FImage;

use crate::albedo_pipeline::common::{AlbedoError, Result, check_same_dimensions, median_in_place};

/// Per-pixel, per-channel median across `estimates`.
///
/// The result does not depend on the order of the inputs. A single estimate
/// is returned unchanged; an empty collection is an error.
pub fn median_fuse(estimates: &[Rgb32FImage]) -> Result<Rgb32FImage> {
    let Some(first) = estimates.first() else {
        return Err(AlbedoError::EmptyFusionSet);
    };

    let dims = first.dimensions();
    for estimate in &estimates[1..] {
        check_same_dimensions(dims, estimate.dimensions())?;
    }

    if estimates.len() == 1 {
        return Ok(first.clone());
    }

    let mut fused = Rgb32FImage::new(dims.0, dims.1);
    let mut samples = Vec::with_capacity(estimates.len());
    for (i, out) in fused.iter_mut().enumerate() {
        samples.clear();
        samples.extend(estimates.iter().map(|e| e.as_raw()[i]));
        // Non-empty by construction
        *out = median_in_place(&mut samples).unwrap_or_default();
    }

    Ok(fused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn constant(value: f32) -> Rgb32FImage {
        Rgb32FImage::from_pixel(6, 5, Rgb([value, value * 2.0, value * 3.0]))
    }

    #[test]
    fn test_single_estimate_unchanged() {
        let estimate = Rgb32FImage::from_fn(5, 4, |x, y| Rgb([x as f32, y as f32, 0.5]));
        let fused = median_fuse(std::slice::from_ref(&estimate)).unwrap();
        assert_eq!(fused, estimate);
    }

    #[test]
    fn test_median_rejects_outlier() {
        let fused = median_fuse(&[constant(1.0), constant(100.0), constant(1.2)]).unwrap();
        let expected = constant(1.2);
        for (f, e) in fused.iter().zip(expected.iter()) {
            assert!((f - e).abs() < 1e-6);
        }
    }

    #[test]
    fn test_two_estimates_average() {
        let fused = median_fuse(&[constant(2.0), constant(4.0)]).unwrap();
        assert!(fused.pixels().all(|p| p.0 == [3.0, 6.0, 9.0]));
    }

    #[test]
    fn test_order_independent() {
        let a = Rgb32FImage::from_fn(4, 4, |x, y| Rgb([x as f32, y as f32, 1.0]));
        let b = Rgb32FImage::from_fn(4, 4, |x, y| Rgb([y as f32, x as f32, 2.0]));
        let c = Rgb32FImage::from_fn(4, 4, |x, y| Rgb([(x * y) as f32, 0.5, 3.0]));
        let d = Rgb32FImage::from_pixel(4, 4, Rgb([0.7, 1.4, 2.1]));

        let forward = median_fuse(&[a.clone(), b.clone(), c.clone(), d.clone()]).unwrap();
        let shuffled = median_fuse(&[c, a, d, b]).unwrap();
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_empty_collection() {
        assert!(matches!(median_fuse(&[]), Err(AlbedoError::EmptyFusionSet)));
    }

    #[test]
    fn test_mismatched_dimensions() {
        let result = median_fuse(&[constant(1.0), Rgb32FImage::new(3, 3)]);
        assert!(matches!(result, Err(AlbedoError::DimensionMismatch { .. })));
    }
}
