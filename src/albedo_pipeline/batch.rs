//! Dataset-level driver.
//!
//! Scenes are independent: a failing scene is logged and recorded, and the
//! remaining scenes are still processed.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{error, info, instrument};

use crate::albedo_pipeline::common::error::{AlbedoError, Result};
use crate::albedo_pipeline::decompose::IntrinsicDecomposer;
use crate::albedo_pipeline::io::{AlbedoWriter, ImageReader};
use crate::albedo_pipeline::scene::ScenePipeline;

/// Names of the scene directories under `root`, sorted. Regular files are ignored.
pub fn list_scenes<P: AsRef<Path>>(root: P) -> Result<Vec<String>> {
    let root = root.as_ref();
    let entries = std::fs::read_dir(root).map_err(|e| {
        AlbedoError::InputReadError(format!("{}: {}", root.display(), e))
    })?;

    let mut scenes = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        scenes.push(entry.file_name().to_string_lossy().into_owned());
    }
    scenes.sort();
    Ok(scenes)
}

/// Outcome of a dataset run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<String>,
    pub failed: Vec<(String, AlbedoError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, scene: String, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.processed.push(scene),
            Err(e) => self.failed.push((scene, e)),
        }
    }
}

pub struct BatchRunner<'p, R: ImageReader, W: AlbedoWriter, D: IntrinsicDecomposer> {
    pipeline: &'p ScenePipeline<R, W, D>,
}

impl<'p, R: ImageReader, W: AlbedoWriter, D: IntrinsicDecomposer> BatchRunner<'p, R, W, D> {
    pub fn new(pipeline: &'p ScenePipeline<R, W, D>) -> Self {
        Self { pipeline }
    }

    fn process_one(&self, root: &Path, scene: &str, done: &AtomicUsize, total: usize) -> Result<()> {
        let outcome = self.pipeline.process_scene_at(root, scene).map(|_| ());
        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        match &outcome {
            Ok(()) => info!("({} / {}) - processed {}", finished, total, scene),
            Err(e) => error!("({} / {}) - failed {}: {}", finished, total, scene, e),
        }
        outcome
    }

    /// Processes every scene under `root` one after another.
    #[instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub fn run<P: AsRef<Path>>(&self, root: P) -> Result<BatchReport> {
        let root = root.as_ref();
        let scenes = list_scenes(root)?;
        info!("found {} scenes", scenes.len());

        let done = AtomicUsize::new(0);
        let mut report = BatchReport::default();
        for scene in scenes.iter() {
            let outcome = self.process_one(root, scene, &done, scenes.len());
            report.record(scene.clone(), outcome);
        }
        Ok(report)
    }
}

impl<'p, R, W, D> BatchRunner<'p, R, W, D>
where
    R: ImageReader + Sync,
    W: AlbedoWriter + Sync,
    D: IntrinsicDecomposer + Sync,
{
    /// Like [`run`](Self::run) but spreads scenes over `jobs` worker threads.
    /// Each scene is still processed sequentially by a single worker.
    #[instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub fn run_parallel<P: AsRef<Path>>(&self, root: P, jobs: usize) -> Result<BatchReport> {
        if jobs <= 1 {
            return self.run(root);
        }

        let root = root.as_ref();
        let scenes = list_scenes(root)?;
        info!("found {} scenes, using {} workers", scenes.len(), jobs);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| AlbedoError::InvalidConfig(format!("thread pool: {}", e)))?;

        let done = AtomicUsize::new(0);
        let outcomes: Vec<Result<()>> = pool.install(|| {
            scenes
                .par_iter()
                .map(|scene| self.process_one(root, scene, &done, scenes.len()))
                .collect()
        });

        let mut report = BatchReport::default();
        for (scene, outcome) in scenes.into_iter().zip(outcomes) {
            report.record(scene, outcome);
        }
        Ok(report)
    }
}
