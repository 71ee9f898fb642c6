pub mod albedo_pipeline;
pub mod logger;
