use image::Rgb32FImage;
use tracing::debug;

use crate::albedo_pipeline::exposure::tonemap::{TonemapParams, tonemap_scale};
use crate::albedo_pipeline::probe::WhiteBalance;

/// A white balanced, exposure-normalized capture
#[derive(Debug, Clone)]
pub struct NormalizedCapture {
    pub image: Rgb32FImage,
    /// Global scale applied after white balance, `None` when tonemapping is off
    pub tonemap_scale: Option<f32>,
}

/// Maps a raw linear capture into the range the decomposer expects.
///
/// With tonemapping the output lies in `[0, 1]`; without it only negative
/// values are clipped.
#[derive(Debug, Clone, Default)]
pub struct ExposureNormalizer {
    tonemap: Option<TonemapParams>,
}

impl ExposureNormalizer {
    pub fn new(tonemap: Option<TonemapParams>) -> Self {
        Self { tonemap }
    }

    pub fn tonemapped() -> Self {
        Self::new(Some(TonemapParams::default()))
    }

    pub fn normalize(&self, capture: &Rgb32FImage, white_balance: &WhiteBalance) -> NormalizedCapture {
        let mut image = white_balance.apply(capture);

        let tonemap_scale = match &self.tonemap {
            Some(params) => {
                let scale = tonemap_scale(&image, params);
                debug!(scale, "Applying tonemap scale");
                for value in image.iter_mut() {
                    *value = (*value * scale).clamp(0.0, 1.0);
                }
                Some(scale)
            }
            None => {
                for value in image.iter_mut() {
                    *value = value.max(0.0);
                }
                None
            }
        };

        NormalizedCapture {
            image,
            tonemap_scale,
        }
    }
}
