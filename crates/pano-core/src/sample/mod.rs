mod resize;

pub use resize::resize_to_width;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::decode::VideoDecoder;
use crate::frame::Frame;

/// Options shared by every sampled source.
#[derive(Clone, Debug)]
pub struct SampleOptions {
    /// Keep every `step`-th frame, starting at index 0.
    pub step: usize,
    /// Downscale frames wider than this to this width. Never upscales.
    pub resize_width: Option<usize>,
}

/// Frame indices to extract from a source with `total_frames` frames:
/// {0, step, 2·step, ...} strictly below the total.
pub fn sampling_plan(total_frames: usize, step: usize) -> Vec<usize> {
    (0..total_frames).step_by(step.max(1)).collect()
}

/// Number of frames all sources are planned to yield, before decode failures.
///
/// Sources that cannot be opened count as zero.
pub fn planned_frame_count(
    decoder: &dyn VideoDecoder,
    paths: &[PathBuf],
    step: usize,
) -> usize {
    paths
        .iter()
        .map(|p| match decoder.frame_count(p) {
            Ok(total) => sampling_plan(total, step).len(),
            Err(_) => 0,
        })
        .sum()
}

/// Extract every `step`-th frame of a single source.
///
/// An unopenable source yields an empty set; individual frames that fail to
/// decode are skipped. Reads for different indices run in parallel on the
/// rayon pool, each opening its own decode handle, and the result preserves
/// plan order regardless of completion order.
pub fn sample_video(
    decoder: &dyn VideoDecoder,
    path: &Path,
    opts: &SampleOptions,
) -> Vec<Frame> {
    sample_video_counted(decoder, path, opts, &|| {})
}

fn sample_video_counted(
    decoder: &dyn VideoDecoder,
    path: &Path,
    opts: &SampleOptions,
    on_frame: &(dyn Fn() + Send + Sync),
) -> Vec<Frame> {
    let total = match decoder.frame_count(path) {
        Ok(total) => total,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Skipping unreadable source");
            return Vec::new();
        }
    };

    let plan = sampling_plan(total, opts.step);
    plan.par_iter()
        .filter_map(|&index| {
            let frame = match decoder.decode_frame(path, index) {
                Ok(frame) => {
                    let frame = match opts.resize_width {
                        Some(width) if frame.width() > width => resize_to_width(&frame, width),
                        _ => frame,
                    };
                    Some(frame)
                }
                Err(err) => {
                    debug!(path = %path.display(), index, error = %err, "Frame decode failed");
                    None
                }
            };
            on_frame();
            frame
        })
        .collect()
}

/// Sample every source and concatenate the results in source-list order.
///
/// Sources run concurrently with respect to each other; a source yielding
/// zero frames contributes nothing without failing the collection. Each
/// frame is tagged with the index of the source it came from.
pub fn collect_frames(
    decoder: &dyn VideoDecoder,
    paths: &[PathBuf],
    opts: &SampleOptions,
) -> Vec<Frame> {
    collect_frames_with_progress(decoder, paths, opts, |_| {})
}

/// Like [`collect_frames`], reporting the running count of processed frame
/// indices (decoded or skipped) as extraction proceeds.
pub fn collect_frames_with_progress(
    decoder: &dyn VideoDecoder,
    paths: &[PathBuf],
    opts: &SampleOptions,
    on_progress: impl Fn(usize) + Send + Sync,
) -> Vec<Frame> {
    let done = AtomicUsize::new(0);
    let on_frame = move || {
        let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
        on_progress(completed);
    };

    let per_source: Vec<Vec<Frame>> = paths
        .par_iter()
        .enumerate()
        .map(|(source_index, path)| {
            let mut frames = sample_video_counted(decoder, path, opts, &on_frame);
            for frame in &mut frames {
                frame.metadata.source_index = source_index;
            }
            frames
        })
        .collect();

    per_source.into_iter().flatten().collect()
}

/// Drop frames that decoded to an empty pixel buffer.
pub fn filter_usable(frames: Vec<Frame>) -> Vec<Frame> {
    frames.into_iter().filter(|f| !f.is_empty()).collect()
}

/// Reduce an oversized frame set to at most `cap` frames by even
/// index-based selection: for i in [0, cap) keep index ⌊i·L/cap⌋.
///
/// Sets already within the cap are returned unchanged. Pure index
/// selection; no pixel data is touched.
pub fn cap_frames(frames: Vec<Frame>, cap: usize) -> Vec<Frame> {
    let len = frames.len();
    if len <= cap || cap == 0 {
        return frames;
    }

    // ⌊i·L/C⌋ is strictly increasing for C < L, so a single forward pass
    // suffices.
    let mut wanted = (0..cap).map(|i| i * len / cap).peekable();
    let mut out = Vec::with_capacity(cap);
    for (index, frame) in frames.into_iter().enumerate() {
        if wanted.peek() == Some(&index) {
            out.push(frame);
            wanted.next();
        }
    }
    out
}
