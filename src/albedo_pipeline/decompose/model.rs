use image::{ImageBuffer, Luma, Rgb32FImage};

use crate::albedo_pipeline::common::error::Result;

pub type GrayF32Image = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Hints describing the input handed to a decomposer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecomposeOptions {
    /// Input is already linear, no display-gamma decoding is wanted
    pub linear: bool,
    /// Output must match the input resolution without internal rescaling
    pub maintain_size: bool,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            linear: true,
            maintain_size: true,
        }
    }
}

/// Albedo/shading split of one image
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub albedo: Rgb32FImage,
    pub shading: Option<GrayF32Image>,
}

/// Splits an image into albedo and shading.
///
/// Implementations must not mutate shared state during inference; one
/// instance is reused for every direction of every scene.
pub trait IntrinsicDecomposer {
    fn decompose(&self, image: &Rgb32FImage, options: &DecomposeOptions) -> Result<Decomposition>;
}

impl<D: IntrinsicDecomposer + ?Sized> IntrinsicDecomposer for &D {
    fn decompose(&self, image: &Rgb32FImage, options: &DecomposeOptions) -> Result<Decomposition> {
        (**self).decompose(image, options)
    }
}

impl<D: IntrinsicDecomposer + ?Sized> IntrinsicDecomposer for Box<D> {
    fn decompose(&self, image: &Rgb32FImage, options: &DecomposeOptions) -> Result<Decomposition> {
        (**self).decompose(image, options)
    }
}
