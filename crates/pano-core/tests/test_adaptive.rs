use std::sync::Mutex;

use ndarray::Array2;

use pano_core::error::PanoError;
use pano_core::frame::Frame;
use pano_core::stitch::{stitch_adaptive, StitchOutcome, StitchPolicy, Stitcher};

fn indexed_frames(count: usize) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let mut frame = Frame::new(Array2::from_elem((2, 2), i as f32), 8);
            frame.metadata.frame_index = i;
            frame
        })
        .collect()
}

fn policy(seed: u64) -> StitchPolicy {
    StitchPolicy {
        seed: Some(seed),
        ..Default::default()
    }
}

/// Records the frame indices of every invocation and always fails.
struct AlwaysFail {
    calls: Mutex<Vec<Vec<usize>>>,
}

impl AlwaysFail {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|c| c.len()).collect()
    }
}

impl Stitcher for AlwaysFail {
    fn stitch(&self, frames: &[Frame]) -> StitchOutcome {
        self.calls
            .lock()
            .unwrap()
            .push(frames.iter().map(|f| f.metadata.frame_index).collect());
        StitchOutcome::Failure("nope".into())
    }
}

/// Succeeds immediately with a 1x1 image.
struct AlwaysSucceed;

impl Stitcher for AlwaysSucceed {
    fn stitch(&self, _frames: &[Frame]) -> StitchOutcome {
        StitchOutcome::Success(Frame::new(Array2::from_elem((1, 1), 1.0f32), 8))
    }
}

/// Panics for the first `panics` invocations, then succeeds.
struct PanicThenSucceed {
    panics: Mutex<u32>,
}

impl Stitcher for PanicThenSucceed {
    fn stitch(&self, _frames: &[Frame]) -> StitchOutcome {
        let mut left = self.panics.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            drop(left);
            panic!("simulated stitch fault");
        }
        StitchOutcome::Success(Frame::new(Array2::from_elem((1, 1), 1.0f32), 8))
    }
}

#[test]
fn success_on_first_attempt_returns_without_subsampling() {
    let result = stitch_adaptive(&AlwaysSucceed, indexed_frames(10), &policy(1)).unwrap();
    assert_eq!(result.width(), 1);
    assert_eq!(result.height(), 1);
}

#[test]
fn below_floor_fails_fatal_without_invoking_stitcher() {
    let stitcher = AlwaysFail::new();
    let err = stitch_adaptive(&stitcher, indexed_frames(9), &StitchPolicy::default()).unwrap_err();
    match err {
        PanoError::TooFewFrames { count, floor } => {
            assert_eq!(count, 9);
            assert_eq!(floor, 10);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(stitcher.call_sizes().is_empty());
}

#[test]
fn at_floor_with_failures_exhausts_after_one_call() {
    let stitcher = AlwaysFail::new();
    let err = stitch_adaptive(&stitcher, indexed_frames(10), &policy(7)).unwrap_err();
    assert!(matches!(err, PanoError::RetriesExhausted { attempts: 1 }));
    // One invocation, with exactly the 10 original frames; never fewer
    // than the floor.
    assert_eq!(stitcher.call_sizes(), vec![10]);
}

#[test]
fn halving_bounded_by_max_attempts() {
    let stitcher = AlwaysFail::new();
    let err = stitch_adaptive(&stitcher, indexed_frames(160), &policy(3)).unwrap_err();
    assert!(matches!(err, PanoError::RetriesExhausted { attempts: 4 }));
    assert_eq!(stitcher.call_sizes(), vec![160, 80, 40, 20]);
}

#[test]
fn every_attempt_respects_frame_floor() {
    let stitcher = AlwaysFail::new();
    let _ = stitch_adaptive(&stitcher, indexed_frames(30), &policy(11));
    for size in stitcher.call_sizes() {
        assert!(size >= 10);
    }
}

#[test]
fn subsampling_preserves_relative_order() {
    let stitcher = AlwaysFail::new();
    let _ = stitch_adaptive(&stitcher, indexed_frames(80), &policy(5));
    for call in stitcher.calls.lock().unwrap().iter() {
        assert!(call.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn fixed_seed_gives_identical_retry_sequences() {
    let a = AlwaysFail::new();
    let b = AlwaysFail::new();
    let _ = stitch_adaptive(&a, indexed_frames(100), &policy(42));
    let _ = stitch_adaptive(&b, indexed_frames(100), &policy(42));
    assert_eq!(*a.calls.lock().unwrap(), *b.calls.lock().unwrap());
}

#[test]
fn different_seeds_may_pick_different_subsets() {
    let a = AlwaysFail::new();
    let b = AlwaysFail::new();
    let _ = stitch_adaptive(&a, indexed_frames(100), &policy(1));
    let _ = stitch_adaptive(&b, indexed_frames(100), &policy(2));
    // First calls are identical (full set); later calls diverge with
    // overwhelming probability.
    assert_ne!(*a.calls.lock().unwrap(), *b.calls.lock().unwrap());
}

#[test]
fn panic_counts_as_one_failed_attempt() {
    let stitcher = PanicThenSucceed {
        panics: Mutex::new(1),
    };
    let result = stitch_adaptive(&stitcher, indexed_frames(40), &policy(9)).unwrap();
    assert_eq!(result.width(), 1);
}

#[test]
fn persistent_panics_exhaust_retries() {
    let stitcher = PanicThenSucceed {
        panics: Mutex::new(100),
    };
    let err = stitch_adaptive(&stitcher, indexed_frames(160), &policy(9)).unwrap_err();
    assert!(matches!(err, PanoError::RetriesExhausted { .. }));
}
