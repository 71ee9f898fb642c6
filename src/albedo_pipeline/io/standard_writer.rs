use std::path::Path;

use image::{ImageError, ImageFormat, Rgb32FImage, RgbImage};
use tracing::debug;

use crate::albedo_pipeline::common::error::{AlbedoError, Result};
use crate::albedo_pipeline::io::writer::{AlbedoFormat, AlbedoWriter};

pub struct StandardAlbedoWriter;

/// Quantizes a `[0, 1]` float image to 8 bits; out-of-range values are clamped.
pub fn to_display_rgb8(image: &Rgb32FImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let data: Vec<u8> = image
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
        .collect();
    // Same pixel count and layout as the source buffer
    RgbImage::from_raw(width, height, data).unwrap_or_else(|| RgbImage::new(width, height))
}

fn map_save_error(path: &Path, e: ImageError) -> AlbedoError {
    match e {
        ImageError::IoError(io) => {
            AlbedoError::OutputWriteError(format!("{}: {}", path.display(), io))
        }
        other => AlbedoError::EncodeError(format!("{}: {}", path.display(), other)),
    }
}

impl AlbedoWriter for StandardAlbedoWriter {
    fn write_albedo(&self, albedo: &Rgb32FImage, path: &Path, format: AlbedoFormat) -> Result<()> {
        debug!("Encoding {:?} albedo: {}x{}", format, albedo.width(), albedo.height());

        match format {
            AlbedoFormat::Exr => albedo
                .save_with_format(path, ImageFormat::OpenExr)
                .map_err(|e| map_save_error(path, e)),
            AlbedoFormat::Png => {
                let max = albedo.iter().copied().fold(0.0f32, f32::max);
                let mut scaled = albedo.clone();
                if max > 0.0 {
                    for value in scaled.iter_mut() {
                        *value /= max;
                    }
                }
                to_display_rgb8(&scaled)
                    .save_with_format(path, ImageFormat::Png)
                    .map_err(|e| map_save_error(path, e))
            }
        }
    }

    fn write_preview(&self, image: &Rgb32FImage, path: &Path) -> Result<()> {
        to_display_rgb8(image)
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| map_save_error(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::albedo_pipeline::io::{ExrImageReader, ImageReader};
    use image::Rgb;
    use tempfile::tempdir;

    fn sample_albedo() -> Rgb32FImage {
        Rgb32FImage::from_fn(9, 7, |x, y| {
            Rgb([x as f32 * 0.37, y as f32 * 1.5 + 0.01, 12.25 / (1.0 + x as f32)])
        })
    }

    #[test]
    fn test_exr_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("albedo.exr");
        let albedo = sample_albedo();

        StandardAlbedoWriter.write_albedo(&albedo, &path, AlbedoFormat::Exr).unwrap();
        let read_back = ExrImageReader.read_image(&path).unwrap();

        assert_eq!(read_back.dimensions(), albedo.dimensions());
        for (a, b) in albedo.iter().zip(read_back.iter()) {
            assert!((a - b).abs() <= 1e-6 * a.abs().max(1.0));
        }
    }

    #[test]
    fn test_png_is_max_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("albedo.png");
        let mut albedo = Rgb32FImage::from_pixel(4, 4, Rgb([2.0, 1.0, 0.0]));
        albedo.put_pixel(0, 0, Rgb([4.0, 4.0, 4.0]));

        StandardAlbedoWriter.write_albedo(&albedo, &path, AlbedoFormat::Png).unwrap();
        let png = image::open(&path).unwrap().into_rgb8();

        assert_eq!(png.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(png.get_pixel(1, 1).0, [127, 63, 0]);
    }

    #[test]
    fn test_display_quantization_clamps() {
        let image = Rgb32FImage::from_pixel(1, 1, Rgb([-0.5, 0.5, 3.0]));
        assert_eq!(to_display_rgb8(&image).get_pixel(0, 0).0, [0, 127, 255]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let result = ExrImageReader.read_image(&dir.path().join("missing.exr"));
        assert!(matches!(result, Err(AlbedoError::InputReadError(_))));
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("albedo.exr");
        let result = StandardAlbedoWriter.write_albedo(&sample_albedo(), &path, AlbedoFormat::Exr);
        assert!(result.is_err());
    }
}
