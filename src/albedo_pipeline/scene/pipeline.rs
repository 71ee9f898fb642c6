use std::fmt;
use std::path::{Path, PathBuf};

use image::Rgb32FImage;
use tracing::{debug, info, instrument, warn};

use crate::albedo_pipeline::{
    align::match_scale,
    common::{AlbedoError, Result},
    decompose::{DecomposeOptions, IntrinsicDecomposer},
    exposure::{ExposureNormalizer, NormalizedCapture},
    fuse::median_fuse,
    io::{AlbedoWriter, ExrImageReader, ImageReader, SceneLayout, StandardAlbedoWriter},
    probe::{ProbeAnalyzer, WhiteBalance},
    scene::{AlbedoConfig, StageTimings, Timer},
};

/// Stages a scene moves through, in order.
///
/// Per-direction stages repeat for every index `0..direction_count`; skipped
/// directions go from `Normalize` to `SaveNormalizedOnly` and never reach
/// `Decompose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStage {
    LoadDirection(usize),
    AnalyzeProbe(usize),
    Normalize(usize),
    SaveNormalizedOnly(usize),
    Decompose(usize),
    Collect(usize),
    AlignAll,
    Fuse,
    WriteOutput,
    WriteNormalized,
    Done,
}

impl SceneStage {
    /// Stage name without the direction index
    pub fn name(&self) -> &'static str {
        match self {
            SceneStage::LoadDirection(_) => "load_direction",
            SceneStage::AnalyzeProbe(_) => "analyze_probe",
            SceneStage::Normalize(_) => "normalize",
            SceneStage::SaveNormalizedOnly(_) => "save_normalized_only",
            SceneStage::Decompose(_) => "decompose",
            SceneStage::Collect(_) => "collect",
            SceneStage::AlignAll => "align_all",
            SceneStage::Fuse => "fuse",
            SceneStage::WriteOutput => "write_output",
            SceneStage::WriteNormalized => "write_normalized",
            SceneStage::Done => "done",
        }
    }

    pub fn direction(&self) -> Option<usize> {
        match *self {
            SceneStage::LoadDirection(d)
            | SceneStage::AnalyzeProbe(d)
            | SceneStage::Normalize(d)
            | SceneStage::SaveNormalizedOnly(d)
            | SceneStage::Decompose(d)
            | SceneStage::Collect(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for SceneStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction() {
            Some(d) => write!(f, "{}({})", self.name(), d),
            None => f.write_str(self.name()),
        }
    }
}

/// What one completed scene produced
#[derive(Debug, Clone)]
pub struct SceneReport {
    pub scene: String,
    pub reference_direction: usize,
    /// Directions whose estimates entered the fusion, in index order
    pub fused_directions: Vec<usize>,
    pub white_balance: Vec<(usize, WhiteBalance)>,
    /// Scale applied to each fused direction; the reference always has 1.0
    pub alignment_scales: Vec<(usize, f32)>,
    pub stages: Vec<SceneStage>,
    pub timings: StageTimings,
    pub output_path: PathBuf,
    pub normalized_written: Vec<PathBuf>,
    pub albedo: Rgb32FImage,
}

/// A stage together with the data it consumes
enum Step {
    LoadDirection(usize),
    AnalyzeProbe {
        direction: usize,
        capture: Rgb32FImage,
        probe: Rgb32FImage,
    },
    Normalize {
        direction: usize,
        capture: Rgb32FImage,
        white_balance: WhiteBalance,
    },
    SaveNormalizedOnly {
        direction: usize,
        normalized: NormalizedCapture,
    },
    Decompose {
        direction: usize,
        normalized: NormalizedCapture,
    },
    Collect {
        direction: usize,
        normalized: NormalizedCapture,
        albedo: Rgb32FImage,
    },
    AlignAll,
    Fuse(Vec<Rgb32FImage>),
    WriteOutput(Rgb32FImage),
    WriteNormalized,
    Done,
}

impl Step {
    fn stage(&self) -> SceneStage {
        match self {
            Step::LoadDirection(d) => SceneStage::LoadDirection(*d),
            Step::AnalyzeProbe { direction, .. } => SceneStage::AnalyzeProbe(*direction),
            Step::Normalize { direction, .. } => SceneStage::Normalize(*direction),
            Step::SaveNormalizedOnly { direction, .. } => SceneStage::SaveNormalizedOnly(*direction),
            Step::Decompose { direction, .. } => SceneStage::Decompose(*direction),
            Step::Collect { direction, .. } => SceneStage::Collect(*direction),
            Step::AlignAll => SceneStage::AlignAll,
            Step::Fuse(_) => SceneStage::Fuse,
            Step::WriteOutput(_) => SceneStage::WriteOutput,
            Step::WriteNormalized => SceneStage::WriteNormalized,
            Step::Done => SceneStage::Done,
        }
    }
}

/// Mutable bookkeeping for the scene currently being processed
struct SceneRun<'a> {
    layout: &'a SceneLayout,
    reference_direction: usize,
    frame_size: Option<(u32, u32)>,
    estimates: Vec<(usize, Rgb32FImage)>,
    exports: Vec<(usize, Rgb32FImage)>,
    white_balance: Vec<(usize, WhiteBalance)>,
    alignment_scales: Vec<(usize, f32)>,
    stages: Vec<SceneStage>,
    timings: StageTimings,
    output: Option<(PathBuf, Rgb32FImage)>,
    normalized_written: Vec<PathBuf>,
}

impl<'a> SceneRun<'a> {
    fn new(layout: &'a SceneLayout, reference_direction: usize) -> Self {
        Self {
            layout,
            reference_direction,
            frame_size: None,
            estimates: Vec::new(),
            exports: Vec::new(),
            white_balance: Vec::new(),
            alignment_scales: Vec::new(),
            stages: Vec::new(),
            timings: StageTimings::new(),
            output: None,
            normalized_written: Vec::new(),
        }
    }

    fn into_report(self) -> Result<SceneReport> {
        let (output_path, albedo) = self.output.ok_or(AlbedoError::EmptyFusionSet)?;
        Ok(SceneReport {
            scene: self.layout.name().to_string(),
            reference_direction: self.reference_direction,
            fused_directions: self.alignment_scales.iter().map(|(d, _)| *d).collect(),
            white_balance: self.white_balance,
            alignment_scales: self.alignment_scales,
            stages: self.stages,
            timings: self.timings,
            output_path,
            normalized_written: self.normalized_written,
            albedo,
        })
    }
}

/// Per-scene albedo estimation over all illumination directions
pub struct ScenePipeline<R: ImageReader, W: AlbedoWriter, D: IntrinsicDecomposer> {
    reader: R,
    writer: W,
    decomposer: D,
    config: AlbedoConfig,
    analyzer: ProbeAnalyzer,
    normalizer: ExposureNormalizer,
}

impl<D: IntrinsicDecomposer> ScenePipeline<ExrImageReader, StandardAlbedoWriter, D> {
    pub fn new(config: AlbedoConfig, decomposer: D) -> Result<Self> {
        Self::with_custom(ExrImageReader, StandardAlbedoWriter, decomposer, config)
    }
}

impl<R: ImageReader, W: AlbedoWriter, D: IntrinsicDecomposer> ScenePipeline<R, W, D> {
    pub fn with_custom(reader: R, writer: W, decomposer: D, config: AlbedoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            writer,
            decomposer,
            analyzer: ProbeAnalyzer::new(config.probe),
            normalizer: ExposureNormalizer::new(config.tonemap_params()),
            config,
        })
    }

    pub fn config(&self) -> &AlbedoConfig {
        &self.config
    }

    fn validate_frame(&self, run: &mut SceneRun<'_>, capture: &Rgb32FImage) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        let (width, height) = capture.dimensions();
        if width == 0 || height == 0 {
            return Err(AlbedoError::InvalidDimensions(width as usize, height as usize));
        }

        match run.frame_size {
            Some(expected) if expected != (width, height) => Err(AlbedoError::DimensionMismatch {
                expected,
                actual: (width, height),
            }),
            Some(_) => Ok(()),
            None => {
                run.frame_size = Some((width, height));
                Ok(())
            }
        }
    }

    /// Removes everything this scene already wrote, plus whatever the failed
    /// write may have left at `failed`.
    fn discard_outputs(&self, run: &mut SceneRun<'_>, failed: &Path) {
        let mut paths = std::mem::take(&mut run.normalized_written);
        paths.extend(run.output.take().map(|(path, _)| path));
        if failed.is_file() {
            paths.push(failed.to_path_buf());
        }

        for path in &paths {
            match self.writer.remove_output(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) => warn!("Cannot remove {}: {}", path.display(), e),
            }
        }
    }

    fn next_direction(&self, direction: usize) -> Step {
        Step::LoadDirection(direction + 1)
    }

    fn advance(&self, run: &mut SceneRun<'_>, step: Step) -> Result<Step> {
        match step {
            Step::LoadDirection(direction) if direction >= self.config.direction_count => {
                Ok(Step::AlignAll)
            }
            Step::LoadDirection(direction) => {
                let capture = self.reader.read_image(&run.layout.capture_path(direction))?;
                self.validate_frame(run, &capture)?;
                let probe = self.reader.read_image(&run.layout.probe_path(direction))?;
                Ok(Step::AnalyzeProbe {
                    direction,
                    capture,
                    probe,
                })
            }
            Step::AnalyzeProbe {
                direction,
                capture,
                probe,
            } => {
                let analysis = self
                    .analyzer
                    .analyze(&probe)
                    .ok_or(AlbedoError::DegenerateProbe { direction })?;
                debug!(
                    direction,
                    valid_pixels = analysis.valid_pixels,
                    coeffs = ?analysis.white_balance.coeffs,
                    "White balance estimated"
                );
                run.white_balance.push((direction, analysis.white_balance));
                Ok(Step::Normalize {
                    direction,
                    capture,
                    white_balance: analysis.white_balance,
                })
            }
            Step::Normalize {
                direction,
                capture,
                white_balance,
            } => {
                let normalized = self.normalizer.normalize(&capture, &white_balance);
                if self.config.is_skipped(direction) {
                    Ok(Step::SaveNormalizedOnly {
                        direction,
                        normalized,
                    })
                } else {
                    Ok(Step::Decompose {
                        direction,
                        normalized,
                    })
                }
            }
            Step::SaveNormalizedOnly {
                direction,
                normalized,
            } => {
                debug!(direction, "Direction in skip set, not decomposed");
                if self.config.save_normalized {
                    run.exports.push((direction, normalized.image));
                }
                Ok(self.next_direction(direction))
            }
            Step::Decompose {
                direction,
                normalized,
            } => {
                let options = DecomposeOptions {
                    linear: true,
                    maintain_size: true,
                };
                let decomposition = self
                    .decomposer
                    .decompose(&normalized.image, &options)
                    .map_err(|e| AlbedoError::DecompositionFailed {
                        direction,
                        reason: e.to_string(),
                    })?;

                let expected = normalized.image.dimensions();
                let actual = decomposition.albedo.dimensions();
                if expected != actual {
                    return Err(AlbedoError::DecompositionFailed {
                        direction,
                        reason: format!(
                            "albedo is {}x{} for a {}x{} input",
                            actual.0, actual.1, expected.0, expected.1
                        ),
                    });
                }

                Ok(Step::Collect {
                    direction,
                    normalized,
                    albedo: decomposition.albedo,
                })
            }
            Step::Collect {
                direction,
                normalized,
                albedo,
            } => {
                run.estimates.push((direction, albedo));
                if self.config.save_normalized {
                    run.exports.push((direction, normalized.image));
                }
                Ok(self.next_direction(direction))
            }
            Step::AlignAll => {
                let mut estimates = std::mem::take(&mut run.estimates).into_iter();
                let Some((reference_direction, reference)) = estimates.next() else {
                    return Err(AlbedoError::EmptyFusionSet);
                };
                debug_assert_eq!(reference_direction, run.reference_direction);

                let mut aligned = Vec::with_capacity(estimates.len() + 1);
                run.alignment_scales.push((reference_direction, 1.0));
                for (direction, estimate) in estimates {
                    let (matched, scale) = match_scale(&estimate, &reference)?;
                    debug!(direction, scale, "Aligned to reference");
                    run.alignment_scales.push((direction, scale));
                    aligned.push(matched);
                }
                aligned.insert(0, reference);
                Ok(Step::Fuse(aligned))
            }
            Step::Fuse(aligned) => Ok(Step::WriteOutput(median_fuse(&aligned)?)),
            Step::WriteOutput(fused) => {
                let format = self.config.output_format;
                let path = run.layout.albedo_path(format);
                self.writer.write_albedo(&fused, &path, format)?;
                run.output = Some((path, fused));
                if self.config.save_normalized {
                    Ok(Step::WriteNormalized)
                } else {
                    Ok(Step::Done)
                }
            }
            Step::WriteNormalized => {
                for (direction, image) in std::mem::take(&mut run.exports) {
                    let path = run.layout.normalized_path(direction);
                    if let Err(e) = self.writer.write_preview(&image, &path) {
                        self.discard_outputs(run, &path);
                        return Err(e);
                    }
                    run.normalized_written.push(path);
                }
                Ok(Step::Done)
            }
            Step::Done => Ok(Step::Done),
        }
    }

    /// Runs the full pipeline for one scene.
    ///
    /// Nothing is written unless every direction succeeds, and a failed
    /// normalized export removes the albedo and earlier exports again.
    #[instrument(skip(self, layout), fields(scene = layout.name()))]
    pub fn process_scene(&self, layout: &SceneLayout) -> Result<SceneReport> {
        let reference_direction = self
            .config
            .reference_direction()
            .ok_or(AlbedoError::EmptyFusionSet)?;

        info!(
            directions = self.config.direction_count,
            skipped = self.config.skip_directions.len(),
            reference_direction,
            "Processing scene"
        );

        let mut run = SceneRun::new(layout, reference_direction);
        let mut step = Step::LoadDirection(0);

        loop {
            let stage = step.stage();
            run.stages.push(stage);
            if stage == SceneStage::Done {
                break;
            }

            let _span = tracing::debug_span!("stage", %stage).entered();
            let timer = Timer::start(stage.name());
            step = self.advance(&mut run, step)?;
            let (name, duration) = timer.stop();
            run.timings.add_step(name, duration);
        }

        run.timings.log_summary(layout.name());
        let report = run.into_report()?;

        info!(
            fused = report.fused_directions.len(),
            output = %report.output_path.display(),
            elapsed_ms = report.timings.total_duration().as_secs_f64() * 1000.0,
            "Scene complete"
        );
        Ok(report)
    }

    /// Convenience wrapper resolving the scene under a dataset root.
    pub fn process_scene_at<P: AsRef<Path>>(&self, root: P, scene_name: &str) -> Result<SceneReport> {
        self.process_scene(&SceneLayout::new(root, scene_name))
    }
}
