use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_FRAMES, DEFAULT_SAMPLE_STEP};
use crate::stitch::StitchPolicy;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source videos, in composition order.
    pub inputs: Vec<PathBuf>,
    /// Destination image path.
    pub output: PathBuf,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub stitching: StitchPolicy,
}

/// Partial sections fill unspecified fields from [`Default`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Keep every `step`-th frame of each source.
    pub step: usize,
    /// Downscale frames wider than this width; never upscale.
    pub resize_width: Option<usize>,
    /// Upper bound on frames handed to the stitcher.
    pub max_frames: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_SAMPLE_STEP,
            resize_width: None,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}
