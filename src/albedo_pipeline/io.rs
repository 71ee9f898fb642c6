//! Dataset I/O module
//!
//! Reading of linear HDR captures and probes, writing of fused albedo maps and
//! preview images, and the per-scene file layout of the dataset.

mod reader;
mod exr_reader;
mod writer;
mod standard_writer;
mod layout;

pub use reader::ImageReader;
pub use exr_reader::ExrImageReader;
pub use writer::{AlbedoFormat, AlbedoWriter};
pub use standard_writer::{StandardAlbedoWriter, to_display_rgb8};
pub use layout::SceneLayout;
