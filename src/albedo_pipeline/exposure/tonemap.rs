use image::Rgb32FImage;

use crate::albedo_pipeline::common::percentile_in_place;

/// Below this p90 brightness the capture is treated as black
const MIN_PERCENTILE_BRIGHTNESS: f32 = 1e-4;

/// Perceptual weights used for the brightness estimate
const BRIGHTNESS_WEIGHTS: [f32; 3] = [0.3, 0.59, 0.11];

/// Auto-exposure parameters: the `percentile` brightness of the capture is
/// mapped to `target_brightness` in gamma-encoded space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonemapParams {
    pub percentile: f32,
    pub target_brightness: f32,
    pub gamma: f32,
}

impl Default for TonemapParams {
    fn default() -> Self {
        Self {
            percentile: 90.0,
            target_brightness: 0.8,
            gamma: 2.2,
        }
    }
}

/// Computes the global linear scale that brings the capture into display range.
///
/// Returns 1.0 for an empty image and 0.0 when the capture is effectively black.
pub fn tonemap_scale(image: &Rgb32FImage, params: &TonemapParams) -> f32 {
    let mut brightness: Vec<f32> = image
        .pixels()
        .map(|p| {
            p.0.iter()
                .zip(BRIGHTNESS_WEIGHTS)
                .map(|(&c, w)| c * w)
                .sum::<f32>()
        })
        .collect();

    let Some(current) = percentile_in_place(&mut brightness, params.percentile) else {
        return 1.0;
    };

    if current < MIN_PERCENTILE_BRIGHTNESS {
        return 0.0;
    }

    // Target is gamma encoded, the capture is linear
    params.target_brightness.powf(params.gamma) / current
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_constant_image_scale() {
        let image = Rgb32FImage::from_pixel(8, 8, Rgb([0.5, 0.5, 0.5]));
        let scale = tonemap_scale(&image, &TonemapParams::default());

        let expected = 0.8f32.powf(2.2) / 0.5;
        assert!((scale - expected).abs() < 1e-5);
    }

    #[test]
    fn test_black_image_scale_is_zero() {
        let image = Rgb32FImage::from_pixel(8, 8, Rgb([0.0, 0.0, 0.0]));
        assert_eq!(tonemap_scale(&image, &TonemapParams::default()), 0.0);
    }

    #[test]
    fn test_empty_image_scale_is_one() {
        let image = Rgb32FImage::new(0, 0);
        assert_eq!(tonemap_scale(&image, &TonemapParams::default()), 1.0);
    }

    #[test]
    fn test_brightness_uses_weighted_channels() {
        let image = Rgb32FImage::from_pixel(4, 4, Rgb([0.0, 1.0, 0.0]));
        let scale = tonemap_scale(&image, &TonemapParams::default());

        let expected = 0.8f32.powf(2.2) / 0.59;
        assert!((scale - expected).abs() < 1e-5);
    }
}
