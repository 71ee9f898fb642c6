use std::path::Path;

use image::Rgb32FImage;

use crate::albedo_pipeline::common::error::{AlbedoError, Result};

/// On-disk format of the fused albedo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlbedoFormat {
    /// Linear 32-bit float OpenEXR
    #[default]
    Exr,
    /// 8-bit PNG, max-normalized (lossy)
    Png,
}

impl AlbedoFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AlbedoFormat::Exr => "exr",
            AlbedoFormat::Png => "png",
        }
    }
}

pub trait AlbedoWriter {
    fn write_albedo(&self, albedo: &Rgb32FImage, path: &Path, format: AlbedoFormat) -> Result<()>;

    /// Writes a display-range image (values clamped to `[0, 1]`) as 8-bit PNG.
    fn write_preview(&self, image: &Rgb32FImage, path: &Path) -> Result<()>;

    /// Deletes a file written earlier for a scene that did not complete.
    /// A file that is already gone is not an error.
    fn remove_output(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AlbedoError::OutputWriteError(format!("{}: {}", path.display(), e))),
        }
    }
}
