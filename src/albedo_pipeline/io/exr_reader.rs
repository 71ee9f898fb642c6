//! Linear HDR image reader backed by the `image` crate.
//!
//! Captures and probes are stored as OpenEXR files. Any RGB(A) layout the
//! decoder produces is converted to 32-bit float RGB; alpha is dropped.

use std::path::Path;

use image::{ImageError, Rgb32FImage};
use tracing::debug;

use crate::albedo_pipeline::common::error::{AlbedoError, Result};
use crate::albedo_pipeline::io::reader::ImageReader;

pub struct ExrImageReader;

impl ImageReader for ExrImageReader {
    fn read_image(&self, path: &Path) -> Result<Rgb32FImage> {
        debug!("Reading {}", path.display());

        let decoded = image::open(path).map_err(|e| match e {
            ImageError::IoError(io) => {
                AlbedoError::InputReadError(format!("{}: {}", path.display(), io))
            }
            other => AlbedoError::DecodeError(format!("{}: {}", path.display(), other)),
        })?;

        let channels = decoded.color().channel_count();
        if channels < 3 {
            return Err(AlbedoError::DecodeError(format!(
                "{}: expected an RGB image, got {} channel(s)",
                path.display(),
                channels
            )));
        }

        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(AlbedoError::InvalidDimensions(width as usize, height as usize));
        }

        debug!("Decoded image: {}x{}", width, height);
        Ok(decoded.into_rgb32f())
    }
}
