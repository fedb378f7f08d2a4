pub mod config;

use tracing::info;

use crate::decode::VideoDecoder;
use crate::error::{PanoError, Result};
use crate::frame::Frame;
use crate::sample::{
    cap_frames, collect_frames_with_progress, filter_usable, planned_frame_count, SampleOptions,
};
use crate::stitch::{stitch_adaptive, Stitcher};

use self::config::PipelineConfig;

/// Pipeline stage, reported to progress callbacks as work proceeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Stitching,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Extracting => write!(f, "Extracting"),
            PipelineStage::Stitching => write!(f, "Stitching"),
        }
    }
}

/// Run the full video-to-panorama pipeline.
pub fn run_pipeline(
    config: &PipelineConfig,
    decoder: &dyn VideoDecoder,
    stitcher: &dyn Stitcher,
) -> Result<Frame> {
    run_pipeline_with_progress(config, decoder, stitcher, |_, _, _| {})
}

/// Run the full pipeline, reporting `(stage, done, total)` as frames are
/// extracted and when stitching begins.
pub fn run_pipeline_with_progress(
    config: &PipelineConfig,
    decoder: &dyn VideoDecoder,
    stitcher: &dyn Stitcher,
    on_progress: impl Fn(PipelineStage, usize, usize) + Send + Sync,
) -> Result<Frame> {
    let opts = SampleOptions {
        step: config.sampling.step,
        resize_width: config.sampling.resize_width,
    };

    let planned = planned_frame_count(decoder, &config.inputs, opts.step);
    info!(
        sources = config.inputs.len(),
        step = opts.step,
        planned,
        "Extracting frames"
    );

    let frames = collect_frames_with_progress(decoder, &config.inputs, &opts, |done| {
        on_progress(PipelineStage::Extracting, done, planned);
    });

    let frames = filter_usable(frames);
    info!(usable = frames.len(), "Frame extraction complete");
    if frames.is_empty() {
        return Err(PanoError::NoUsableFrames);
    }

    let frames = cap_frames(frames, config.sampling.max_frames);
    info!(frames = frames.len(), "Frames selected for stitching");

    on_progress(PipelineStage::Stitching, 0, 1);
    stitch_adaptive(stitcher, frames, &config.stitching)
}
