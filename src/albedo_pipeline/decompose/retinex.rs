//! Single-scale Retinex decomposition.
//!
//! Shading is modelled as the Gaussian-blurred luminance of the input, and
//! albedo as the input divided by that shading. This is a classic baseline,
//! not a learned model, but it honours the same input/output contract.

use image::{Luma, Rgb, Rgb32FImage, imageops::{self, FilterType}};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use crate::albedo_pipeline::common::error::{AlbedoError, Result};
use crate::albedo_pipeline::decompose::model::{
    DecomposeOptions, Decomposition, GrayF32Image, IntrinsicDecomposer,
};

const EPSILON: f32 = 1e-6;

const LUMINANCE_WEIGHTS: [f32; 3] = [0.3, 0.59, 0.11];

/// Display gamma undone when the caller passes non-linear input
const DISPLAY_GAMMA: f32 = 2.2;

pub const DEFAULT_SIGMA: f32 = 15.0;

/// Longest side used for the shading estimate when resizing is allowed
pub const DEFAULT_WORKING_SIZE: u32 = 512;

#[derive(Debug, Clone)]
pub struct RetinexDecomposer {
    sigma: f32,
    working_size: u32,
}

impl RetinexDecomposer {
    pub fn new(sigma: f32) -> Result<Self> {
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Err(AlbedoError::InvalidConfig(format!(
                "Retinex sigma must be positive, got {}",
                sigma
            )));
        }
        Ok(Self {
            sigma,
            working_size: DEFAULT_WORKING_SIZE,
        })
    }

    pub fn with_working_size(mut self, working_size: u32) -> Self {
        self.working_size = working_size.max(1);
        self
    }

    fn luminance(image: &Rgb32FImage) -> GrayF32Image {
        GrayF32Image::from_fn(image.width(), image.height(), |x, y| {
            let p = image.get_pixel(x, y).0;
            let l = p.iter().zip(LUMINANCE_WEIGHTS).map(|(&c, w)| c * w).sum::<f32>();
            Luma([l])
        })
    }

    fn shading(&self, luminance: &GrayF32Image, maintain_size: bool) -> GrayF32Image {
        let (width, height) = luminance.dimensions();
        let longest = width.max(height);

        if maintain_size || longest <= self.working_size {
            return gaussian_blur_f32(luminance, self.sigma);
        }

        let ratio = self.working_size as f32 / longest as f32;
        let small_w = ((width as f32 * ratio).round() as u32).max(1);
        let small_h = ((height as f32 * ratio).round() as u32).max(1);
        debug!(small_w, small_h, "Estimating shading at working resolution");

        let small = imageops::resize(luminance, small_w, small_h, FilterType::Triangle);
        let blurred = gaussian_blur_f32(&small, (self.sigma * ratio).max(EPSILON));
        imageops::resize(&blurred, width, height, FilterType::Triangle)
    }
}

impl Default for RetinexDecomposer {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            working_size: DEFAULT_WORKING_SIZE,
        }
    }
}

impl IntrinsicDecomposer for RetinexDecomposer {
    fn decompose(&self, image: &Rgb32FImage, options: &DecomposeOptions) -> Result<Decomposition> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AlbedoError::InvalidDimensions(width as usize, height as usize));
        }

        let mut linear = image.clone();
        if !options.linear {
            for value in linear.iter_mut() {
                *value = value.max(0.0).powf(DISPLAY_GAMMA);
            }
        }

        let shading = self.shading(&Self::luminance(&linear), options.maintain_size);

        let albedo = Rgb32FImage::from_fn(width, height, |x, y| {
            let s = shading.get_pixel(x, y).0[0].max(EPSILON);
            let p = linear.get_pixel(x, y).0;
            Rgb([p[0] / s, p[1] / s, p[2] / s])
        });

        Ok(Decomposition {
            albedo,
            shading: Some(shading),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_sigma() {
        assert!(matches!(RetinexDecomposer::new(0.0), Err(AlbedoError::InvalidConfig(_))));
        assert!(RetinexDecomposer::new(-1.0).is_err());
        assert!(RetinexDecomposer::new(2.0).is_ok());
    }

    #[test]
    fn test_uniform_image_gives_flat_albedo() {
        let image = Rgb32FImage::from_pixel(24, 16, Rgb([0.2, 0.4, 0.6]));
        let result = RetinexDecomposer::new(3.0)
            .unwrap()
            .decompose(&image, &DecomposeOptions::default())
            .unwrap();

        assert_eq!(result.albedo.dimensions(), (24, 16));
        let first = result.albedo.get_pixel(0, 0).0;
        for p in result.albedo.pixels() {
            for c in 0..3 {
                assert!((p.0[c] - first[c]).abs() < 1e-3);
            }
        }
        // Chromaticity survives the division by gray shading
        assert!((first[2] / first[0] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_downscaled_shading_keeps_size() {
        let image = Rgb32FImage::from_fn(64, 40, |x, _| Rgb([0.1 + x as f32 * 0.01; 3]));
        let options = DecomposeOptions { linear: true, maintain_size: false };
        let result = RetinexDecomposer::new(4.0)
            .unwrap()
            .with_working_size(16)
            .decompose(&image, &options)
            .unwrap();

        assert_eq!(result.albedo.dimensions(), (64, 40));
        assert_eq!(result.shading.unwrap().dimensions(), (64, 40));
    }

    #[test]
    fn test_empty_image_rejected() {
        let image = Rgb32FImage::new(0, 5);
        let result = RetinexDecomposer::default().decompose(&image, &DecomposeOptions::default());
        assert!(matches!(result, Err(AlbedoError::InvalidDimensions(0, 5))));
    }
}
