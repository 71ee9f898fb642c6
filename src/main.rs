use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use mid_albedo::albedo_pipeline::{
    AlbedoConfig, AlbedoFormat, BatchRunner, DEFAULT_SIGMA, RetinexDecomposer, ScenePipeline,
};
use mid_albedo::logger;

use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mid-albedo")]
#[command(version, about = "Median albedo estimation for multi-illumination scenes", long_about = None)]
struct Cli {
    /// Path to the Multi-Illumination Dataset split (train or test)
    #[arg(long, value_name = "DIR")]
    mid_path: PathBuf,

    /// Save the white balanced and preprocessed captures as PNG
    #[arg(long)]
    save_imgs: bool,

    /// Write the albedo as a max-normalized PNG instead of EXR
    #[arg(long)]
    png: bool,

    /// Keep captures linear instead of auto-exposing them to [0, 1]
    #[arg(long)]
    no_tonemap: bool,

    /// Directions left out of the median (comma-separated)
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    skip: Option<Vec<usize>>,

    /// Number of illumination directions per scene; without --skip, default
    /// skip indices beyond the count are dropped
    #[arg(long, value_name = "N")]
    directions: Option<usize>,

    /// Gaussian scale of the Retinex shading estimate
    #[arg(long, value_name = "FLOAT", default_value_t = DEFAULT_SIGMA)]
    sigma: f32,

    /// Number of scenes processed in parallel
    #[arg(short = 'j', long, value_name = "N", default_value = "1")]
    jobs: usize,

    /// Log per-direction details and stage timings
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(if cli.verbose { "debug" } else { "info" });

    let mut builder = AlbedoConfig::builder()
        .tonemap(!cli.no_tonemap)
        .save_normalized(cli.save_imgs)
        .output_format(if cli.png { AlbedoFormat::Png } else { AlbedoFormat::Exr });
    if let Some(skip) = cli.skip {
        builder = builder.skip_directions(skip);
    }
    if let Some(directions) = cli.directions {
        builder = builder.direction_count(directions);
    }
    let config = builder.build();

    let decomposer = RetinexDecomposer::new(cli.sigma)?;
    let pipeline = ScenePipeline::new(config, decomposer).context("invalid pipeline configuration")?;

    info!(
        "Albedo pipeline initialized: {} directions, skipping {:?}, output {:?}",
        pipeline.config().direction_count,
        pipeline.config().skip_directions,
        pipeline.config().output_format
    );

    let report = BatchRunner::new(&pipeline)
        .run_parallel(&cli.mid_path, cli.jobs)
        .with_context(|| format!("cannot process dataset at {}", cli.mid_path.display()))?;

    info!(
        "Finished: {} of {} scenes processed",
        report.processed.len(),
        report.total()
    );

    if !report.is_success() {
        for (scene, e) in &report.failed {
            error!("{}: {}", scene, e);
        }
        bail!("{} scene(s) failed", report.failed.len());
    }

    Ok(())
}
