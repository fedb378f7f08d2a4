use std::panic::{self, AssertUnwindSafe};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::consts::{DEFAULT_MAX_ATTEMPTS, MIN_STITCH_FRAMES};
use crate::error::{PanoError, Result};
use crate::frame::Frame;

use super::{StitchOutcome, Stitcher};

/// Retry policy for the adaptive stitch loop.
///
/// Partial config sections fill unspecified fields from [`Default`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StitchPolicy {
    /// Maximum number of stitch invocations before giving up.
    pub max_attempts: u32,
    /// Frame count below which stitching is never attempted.
    pub min_frames: usize,
    /// Seed for the retry subsampling RNG. `None` draws from entropy,
    /// matching the non-deterministic retries of interactive use; tests
    /// and reproducible runs inject a fixed seed.
    pub seed: Option<u64>,
}

impl Default for StitchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_frames: MIN_STITCH_FRAMES,
            seed: None,
        }
    }
}

/// Repeatedly attempt to stitch `frames`, halving the set at random on
/// each failure.
///
/// A set smaller than `policy.min_frames` fails immediately without ever
/// invoking the stitcher. Otherwise each attempt consumes one of
/// `policy.max_attempts`; on failure a uniformly random half of the current
/// frames (relative order preserved) is kept for the next attempt. The loop
/// stops once attempts are exhausted or the halved set would fall below the
/// floor. A panicking stitcher is caught at this boundary and counts as an
/// ordinary failed attempt.
pub fn stitch_adaptive(
    stitcher: &dyn Stitcher,
    mut frames: Vec<Frame>,
    policy: &StitchPolicy,
) -> Result<Frame> {
    if frames.len() < policy.min_frames {
        return Err(PanoError::TooFewFrames {
            count: frames.len(),
            floor: policy.min_frames,
        });
    }

    let mut rng = match policy.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut attempt = 0u32;
    while attempt < policy.max_attempts && frames.len() >= policy.min_frames {
        info!(attempt = attempt + 1, frames = frames.len(), "Stitching");

        match invoke(stitcher, &frames) {
            StitchOutcome::Success(image) if !image.is_empty() => {
                info!(
                    width = image.width(),
                    height = image.height(),
                    "Stitch succeeded"
                );
                return Ok(image);
            }
            StitchOutcome::Success(_) => {
                warn!("Stitcher returned an empty image; retrying with fewer frames");
            }
            StitchOutcome::Failure(reason) => {
                warn!(reason = %reason, "Stitch failed; retrying with fewer frames");
            }
        }

        frames = random_half(&mut rng, frames);
        attempt += 1;
    }

    Err(PanoError::RetriesExhausted { attempts: attempt })
}

/// Invoke the stitcher, mapping any panic into a plain failure so the retry
/// loop never distinguishes fault kinds.
fn invoke(stitcher: &dyn Stitcher, frames: &[Frame]) -> StitchOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| stitcher.stitch(frames))) {
        Ok(outcome) => outcome,
        Err(_) => StitchOutcome::Failure("Stitcher panicked".into()),
    }
}

/// Keep a uniformly random half of `frames` (without replacement),
/// preserving the relative order of the survivors.
fn random_half(rng: &mut StdRng, frames: Vec<Frame>) -> Vec<Frame> {
    let keep = frames.len() / 2;
    let mut picked = rand::seq::index::sample(rng, frames.len(), keep).into_vec();
    picked.sort_unstable();

    let mut picked = picked.into_iter().peekable();
    frames
        .into_iter()
        .enumerate()
        .filter_map(|(index, frame)| {
            if picked.peek() == Some(&index) {
                picked.next();
                Some(frame)
            } else {
                None
            }
        })
        .collect()
}
