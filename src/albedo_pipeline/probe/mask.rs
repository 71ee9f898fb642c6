use image::{GrayImage, Luma, Rgb32FImage, imageops};
use imageproc::distance_transform::Norm;
use imageproc::morphology::erode;

const VALID: u8 = u8::MAX;
const INVALID: u8 = 0;

/// Parameters controlling which probe pixels are trusted
#[derive(Debug, Clone, Copy)]
pub struct ProbeParams {
    /// A pixel is valid when any channel exceeds this value
    pub threshold: f32,
    /// Chessboard erosion radius; 5 gives an 11x11 structuring element
    pub erosion_radius: u8,
}

impl Default for ProbeParams {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            erosion_radius: 5,
        }
    }
}

/// Builds the eroded valid-pixel mask of a probe capture.
///
/// The raw mask is padded with one invalid pixel on every side before the
/// erosion, so nothing within `erosion_radius` pixels of the probe border
/// survives. Valid pixels are `u8::MAX`, the result has the probe's size.
pub fn valid_pixel_mask(probe: &Rgb32FImage, params: &ProbeParams) -> GrayImage {
    let (width, height) = probe.dimensions();

    let mut padded = GrayImage::from_pixel(width + 2, height + 2, Luma([INVALID]));
    for (x, y, pixel) in probe.enumerate_pixels() {
        if pixel.0.iter().any(|&c| c > params.threshold) {
            padded.put_pixel(x + 1, y + 1, Luma([VALID]));
        }
    }

    let eroded = erode(&padded, Norm::LInf, params.erosion_radius);
    imageops::crop_imm(&eroded, 1, 1, width, height).to_image()
}
