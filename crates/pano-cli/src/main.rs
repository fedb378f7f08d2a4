mod summary;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pano_core::decode::SerDecoder;
use pano_core::io::image_io::save_image;
use pano_core::pipeline::config::{PipelineConfig, SamplingConfig};
use pano_core::pipeline::{run_pipeline_with_progress, PipelineStage};
use pano_core::stitch::{StitchPolicy, TranslationStitcher};

#[derive(Parser)]
#[command(name = "pano", about = "Build an ultra-high-resolution panorama from video(s)")]
#[command(version)]
struct Cli {
    /// Comma-separated list of input SER videos
    #[arg(long, value_delimiter = ',', required_unless_present = "config")]
    input: Vec<PathBuf>,

    /// Destination image (e.g. panorama.tiff)
    #[arg(short, long, required_unless_present = "config")]
    output: Option<PathBuf>,

    /// Take every N-th frame of each source
    #[arg(long, default_value = "100")]
    step: usize,

    /// Down-scale each frame so width <= WIDTH px
    #[arg(long, value_name = "WIDTH")]
    resize: Option<usize>,

    /// Upper bound on frames fed to the stitcher
    #[arg(long, default_value = "800")]
    max_frames: usize,

    /// Stitch attempts before giving up
    #[arg(long, default_value = "4")]
    max_attempts: u32,

    /// Seed for the retry subsampling RNG (reproducible retries)
    #[arg(long)]
    seed: Option<u64>,

    /// Pipeline config file (TOML); overrides the flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = if let Some(ref config_path) = cli.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(&cli)?
    };

    let missing: Vec<_> = config.inputs.iter().filter(|p| !p.exists()).collect();
    if !missing.is_empty() {
        for path in &missing {
            eprintln!("File not found: {}", path.display());
        }
        bail!("{} input file(s) missing", missing.len());
    }

    summary::print_run_summary(&config);

    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:12} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message(PipelineStage::Extracting.to_string());

    let started = std::time::Instant::now();
    let decoder = SerDecoder;
    let stitcher = TranslationStitcher::default();
    let panorama = run_pipeline_with_progress(&config, &decoder, &stitcher, |stage, done, total| {
        match stage {
            PipelineStage::Extracting => {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            }
            PipelineStage::Stitching => {
                pb.set_message(stage.to_string());
            }
        }
    })?;
    pb.finish_with_message("Done");
    info!(elapsed_s = started.elapsed().as_secs_f32(), "Pipeline complete");

    save_image(&panorama, &config.output)?;
    println!("\nPanorama saved to {}", config.output.display());

    Ok(())
}

fn build_config_from_args(cli: &Cli) -> Result<PipelineConfig> {
    let output = match cli.output.clone() {
        Some(path) => path,
        None => bail!("--output is required when no config file is given"),
    };
    Ok(PipelineConfig {
        inputs: cli.input.clone(),
        output,
        sampling: SamplingConfig {
            step: cli.step.max(1),
            resize_width: cli.resize,
            max_frames: cli.max_frames,
        },
        stitching: StitchPolicy {
            max_attempts: cli.max_attempts,
            seed: cli.seed,
            ..Default::default()
        },
    })
}
