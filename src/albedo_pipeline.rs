//! Multi-illumination albedo pipeline
//!
//! This module turns the differently-lit captures of one static scene into a
//! single illumination-invariant albedo map. Each direction is white balanced
//! against its light probe, exposure-normalized, decomposed, scale-aligned to a
//! reference direction and finally fused with a per-pixel median.

pub mod common;
pub mod probe;
pub mod exposure;
pub mod decompose;
pub mod align;
pub mod fuse;
pub mod io;
pub mod scene;
pub mod batch;

pub use common::{
    AlbedoError,
    Result,
};

pub use probe::{
    ProbeAnalysis,
    ProbeAnalyzer,
    ProbeParams,
    WhiteBalance,
};

pub use exposure::{
    ExposureNormalizer,
    TonemapParams,
};

pub use decompose::{
    DecomposeOptions,
    Decomposition,
    IntrinsicDecomposer,
    RetinexDecomposer,
    DEFAULT_SIGMA,
};

pub use align::{match_scale, scale_factor};
pub use fuse::median_fuse;

pub use io::{
    AlbedoFormat,
    AlbedoWriter,
    ExrImageReader,
    ImageReader,
    SceneLayout,
    StandardAlbedoWriter,
};

pub use scene::{
    AlbedoConfig,
    AlbedoConfigBuilder,
    SceneReport,
    ScenePipeline,
    SceneStage,
    StageTimings,
};

pub use batch::{BatchReport, BatchRunner, list_scenes};
