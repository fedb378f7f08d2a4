use std::collections::HashSet;
use std::path::Path;

use ndarray::Array2;

use pano_core::decode::VideoDecoder;
use pano_core::error::{PanoError, Result};
use pano_core::frame::Frame;
use pano_core::sample::{sample_video, sampling_plan, SampleOptions};

/// In-memory decoder producing `width x height` frames whose pixels all
/// equal `index / 1000`, with optional injected failures.
struct StubDecoder {
    total: usize,
    width: usize,
    height: usize,
    fail_indices: HashSet<usize>,
}

impl StubDecoder {
    fn new(total: usize) -> Self {
        Self {
            total,
            width: 4,
            height: 4,
            fail_indices: HashSet::new(),
        }
    }
}

impl VideoDecoder for StubDecoder {
    fn frame_count(&self, _path: &Path) -> Result<usize> {
        Ok(self.total)
    }

    fn decode_frame(&self, _path: &Path, index: usize) -> Result<Frame> {
        if self.fail_indices.contains(&index) {
            return Err(PanoError::Pipeline(format!("injected failure at {index}")));
        }
        let data = Array2::from_elem((self.height, self.width), index as f32 / 1000.0);
        let mut frame = Frame::new(data, 8);
        frame.metadata.frame_index = index;
        Ok(frame)
    }
}

/// Decoder whose sources can never be opened.
struct UnopenableDecoder;

impl VideoDecoder for UnopenableDecoder {
    fn frame_count(&self, path: &Path) -> Result<usize> {
        Err(PanoError::SourceUnreadable(path.to_path_buf()))
    }

    fn decode_frame(&self, path: &Path, _index: usize) -> Result<Frame> {
        Err(PanoError::SourceUnreadable(path.to_path_buf()))
    }
}

fn opts(step: usize) -> SampleOptions {
    SampleOptions {
        step,
        resize_width: None,
    }
}

#[test]
fn plan_has_ceil_count_starting_at_zero() {
    for &(total, step) in &[(250usize, 100usize), (150, 100), (1, 1), (99, 100), (1000, 7)] {
        let plan = sampling_plan(total, step);
        let expected = total.div_ceil(step);
        assert_eq!(plan.len(), expected, "total={total} step={step}");
        assert_eq!(plan[0], 0);
        assert!(plan.windows(2).all(|w| w[1] == w[0] + step));
        assert!(plan.iter().all(|&i| i < total));
    }
}

#[test]
fn plan_is_empty_for_empty_source() {
    assert!(sampling_plan(0, 100).is_empty());
}

#[test]
fn sampler_extracts_in_plan_order() {
    let decoder = StubDecoder::new(250);
    let frames = sample_video(&decoder, Path::new("a.ser"), &opts(100));

    let indices: Vec<_> = frames.iter().map(|f| f.metadata.frame_index).collect();
    assert_eq!(indices, vec![0, 100, 200]);
}

#[test]
fn sampler_skips_failed_decodes_without_reordering() {
    let mut decoder = StubDecoder::new(1000);
    decoder.fail_indices = [300usize, 700].into_iter().collect();

    let frames = sample_video(&decoder, Path::new("a.ser"), &opts(100));
    let indices: Vec<_> = frames.iter().map(|f| f.metadata.frame_index).collect();
    assert_eq!(indices, vec![0, 100, 200, 400, 500, 600, 800, 900]);
}

#[test]
fn unopenable_source_yields_empty_set() {
    let frames = sample_video(&UnopenableDecoder, Path::new("nope.ser"), &opts(10));
    assert!(frames.is_empty());
}

#[test]
fn sampler_downscales_wide_frames() {
    let mut decoder = StubDecoder::new(10);
    decoder.width = 8;
    decoder.height = 4;

    let frames = sample_video(
        &decoder,
        Path::new("a.ser"),
        &SampleOptions {
            step: 5,
            resize_width: Some(4),
        },
    );
    assert_eq!(frames.len(), 2);
    for frame in &frames {
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
    }
}

#[test]
fn sampler_leaves_narrow_frames_alone() {
    let decoder = StubDecoder::new(10);

    let frames = sample_video(
        &decoder,
        Path::new("a.ser"),
        &SampleOptions {
            step: 5,
            resize_width: Some(32),
        },
    );
    for frame in &frames {
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 4);
    }
}
