//! Scene orchestration module
//!
//! Drives every direction of one scene through probe analysis, exposure
//! normalization and decomposition, then aligns and fuses the estimates.

mod types;
mod timing;
mod pipeline;


pub use types::{
    AlbedoConfig,
    AlbedoConfigBuilder,
    DEFAULT_DIRECTION_COUNT,
    DEFAULT_SKIP_DIRECTIONS,
};
pub use timing::{StageTimings, StepTiming, Timer};
pub use pipeline::{SceneReport, ScenePipeline, SceneStage};
