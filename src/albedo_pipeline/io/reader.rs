use std::path::Path;

use image::Rgb32FImage;

use crate::albedo_pipeline::common::error::Result;

pub trait ImageReader {
    fn read_image(&self, path: &Path) -> Result<Rgb32FImage>;
}
