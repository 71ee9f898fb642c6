//! Scene processing configuration types

use std::collections::BTreeSet;

use crate::albedo_pipeline::common::error::{AlbedoError, Result};
use crate::albedo_pipeline::exposure::TonemapParams;
use crate::albedo_pipeline::io::AlbedoFormat;
use crate::albedo_pipeline::probe::ProbeParams;

/// Illumination directions captured per scene
pub const DEFAULT_DIRECTION_COUNT: usize = 25;

/// Directions with hard flash and saturated pixels; they would bias the median
pub const DEFAULT_SKIP_DIRECTIONS: [usize; 5] = [2, 3, 20, 21, 24];

/// Configuration for per-scene albedo estimation
#[derive(Debug, Clone)]
pub struct AlbedoConfig {
    /// Number of directional captures (and probes) per scene
    pub direction_count: usize,
    /// Directions excluded from decomposition and fusion
    pub skip_directions: BTreeSet<usize>,
    /// Whether white-balanced captures are auto-exposed and clipped to `[0, 1]`
    pub tonemap: bool,
    pub tonemap_params: TonemapParams,
    pub probe: ProbeParams,
    /// Write every normalized capture as `dir_{i}_mip2.png`
    pub save_normalized: bool,
    pub output_format: AlbedoFormat,
    /// Whether all captures of a scene must share one non-empty size
    pub validate_dimensions: bool,
}

impl Default for AlbedoConfig {
    fn default() -> Self {
        Self {
            direction_count: DEFAULT_DIRECTION_COUNT,
            skip_directions: DEFAULT_SKIP_DIRECTIONS.into_iter().collect(),
            tonemap: true,
            tonemap_params: TonemapParams::default(),
            probe: ProbeParams::default(),
            save_normalized: false,
            output_format: AlbedoFormat::Exr,
            validate_dimensions: true,
        }
    }
}

impl AlbedoConfig {
    pub fn builder() -> AlbedoConfigBuilder {
        AlbedoConfigBuilder::default()
    }

    pub fn is_skipped(&self, direction: usize) -> bool {
        self.skip_directions.contains(&direction)
    }

    /// The lowest direction index outside the skip set. Every other estimate
    /// is scaled to match this one.
    pub fn reference_direction(&self) -> Option<usize> {
        (0..self.direction_count).find(|d| !self.is_skipped(*d))
    }

    pub fn tonemap_params(&self) -> Option<TonemapParams> {
        self.tonemap.then_some(self.tonemap_params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.direction_count == 0 {
            return Err(AlbedoError::InvalidConfig(
                "direction count must be at least 1".to_string(),
            ));
        }

        if let Some(&bad) = self.skip_directions.iter().find(|&&d| d >= self.direction_count) {
            return Err(AlbedoError::InvalidConfig(format!(
                "skip direction {} is outside 0..{}",
                bad, self.direction_count
            )));
        }

        let tm = &self.tonemap_params;
        if !(0.0..=100.0).contains(&tm.percentile) {
            return Err(AlbedoError::InvalidConfig(format!(
                "tonemap percentile must be within 0..=100, got {}",
                tm.percentile
            )));
        }
        if !(tm.target_brightness > 0.0 && tm.gamma > 0.0) {
            return Err(AlbedoError::InvalidConfig(format!(
                "tonemap brightness and gamma must be positive, got {} and {}",
                tm.target_brightness, tm.gamma
            )));
        }

        if !(self.probe.threshold >= 0.0 && self.probe.threshold.is_finite()) {
            return Err(AlbedoError::InvalidConfig(format!(
                "probe threshold must be a non-negative number, got {}",
                self.probe.threshold
            )));
        }

        Ok(())
    }
}

/// Builder for AlbedoConfig
#[derive(Default)]
pub struct AlbedoConfigBuilder {
    direction_count: Option<usize>,
    skip_directions: Option<BTreeSet<usize>>,
    tonemap: Option<bool>,
    tonemap_params: Option<TonemapParams>,
    probe: Option<ProbeParams>,
    save_normalized: Option<bool>,
    output_format: Option<AlbedoFormat>,
    validate_dimensions: Option<bool>,
}

impl AlbedoConfigBuilder {
    pub fn direction_count(mut self, count: usize) -> Self {
        self.direction_count = Some(count);
        self
    }

    pub fn skip_directions<I: IntoIterator<Item = usize>>(mut self, directions: I) -> Self {
        self.skip_directions = Some(directions.into_iter().collect());
        self
    }

    pub fn tonemap(mut self, enable: bool) -> Self {
        self.tonemap = Some(enable);
        self
    }

    pub fn tonemap_params(mut self, params: TonemapParams) -> Self {
        self.tonemap_params = Some(params);
        self
    }

    pub fn probe(mut self, params: ProbeParams) -> Self {
        self.probe = Some(params);
        self
    }

    pub fn save_normalized(mut self, enable: bool) -> Self {
        self.save_normalized = Some(enable);
        self
    }

    pub fn output_format(mut self, format: AlbedoFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    /// Builds the config. When only the direction count is set, default skip
    /// indices beyond it are dropped; an explicit skip set is kept as given.
    pub fn build(self) -> AlbedoConfig {
        let default = AlbedoConfig::default();
        let direction_count = self.direction_count.unwrap_or(default.direction_count);
        let skip_directions = self.skip_directions.unwrap_or_else(|| {
            default
                .skip_directions
                .into_iter()
                .filter(|&d| d < direction_count)
                .collect()
        });
        AlbedoConfig {
            direction_count,
            skip_directions,
            tonemap: self.tonemap.unwrap_or(default.tonemap),
            tonemap_params: self.tonemap_params.unwrap_or(default.tonemap_params),
            probe: self.probe.unwrap_or(default.probe),
            save_normalized: self.save_normalized.unwrap_or(default.save_normalized),
            output_format: self.output_format.unwrap_or(default.output_format),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}
