//! Intrinsic decomposition module
//!
//! The pipeline only relies on the [`IntrinsicDecomposer`] contract: a
//! normalized linear image goes in, an albedo estimate of the same size comes
//! out. A deterministic Retinex baseline is provided as the built-in backend.

mod model;
mod retinex;

pub use model::{DecomposeOptions, Decomposition, GrayF32Image, IntrinsicDecomposer};
pub use retinex::{DEFAULT_SIGMA, RetinexDecomposer};
