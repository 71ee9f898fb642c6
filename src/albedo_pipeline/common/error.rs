use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlbedoError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Image dimensions differ: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Light probe for direction {direction} has no valid pixels after erosion")]
    DegenerateProbe { direction: usize },

    #[error("Decomposition failed for direction {direction}: {reason}")]
    DecompositionFailed { direction: usize, reason: String },

    #[error("Every direction is in the skip set, nothing to fuse")]
    EmptyFusionSet,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AlbedoError>;
