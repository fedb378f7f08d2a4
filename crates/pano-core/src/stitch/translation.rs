use ndarray::Array2;
use tracing::debug;

use crate::align::phase_correlate;
use crate::consts::MIN_CORRELATION_RESPONSE;
use crate::frame::Frame;

use super::{StitchOutcome, Stitcher};

/// Panorama compositor for translational motion.
///
/// Measures the shift between each consecutive frame pair by FFT phase
/// correlation, accumulates the shifts into canvas positions, and averages
/// every frame onto a common canvas. Rotation, perspective and lens
/// distortion are not modeled; a correlation peak below `min_response` is
/// treated as "no reliable overlap" and fails the whole invocation.
#[derive(Clone, Copy, Debug)]
pub struct TranslationStitcher {
    pub min_response: f32,
}

impl Default for TranslationStitcher {
    fn default() -> Self {
        Self {
            min_response: MIN_CORRELATION_RESPONSE,
        }
    }
}

impl Stitcher for TranslationStitcher {
    fn stitch(&self, frames: &[Frame]) -> StitchOutcome {
        if frames.len() < 2 {
            return StitchOutcome::Failure("Need at least two frames to stitch".into());
        }

        let h = frames[0].height();
        let w = frames[0].width();
        if frames.iter().any(|f| f.height() != h || f.width() != w) {
            return StitchOutcome::Failure("Frames have mismatched dimensions".into());
        }

        // Cumulative canvas position of each frame, first frame at origin.
        let mut positions: Vec<(i64, i64)> = Vec::with_capacity(frames.len());
        positions.push((0, 0));
        for pair in frames.windows(2) {
            let shift = match phase_correlate(&pair[0], &pair[1]) {
                Ok(shift) => shift,
                Err(err) => return StitchOutcome::Failure(err.to_string()),
            };
            if shift.response < self.min_response {
                return StitchOutcome::Failure(format!(
                    "Correlation peak {:.4} below threshold {:.4}",
                    shift.response, self.min_response
                ));
            }
            let (px, py) = *positions.last().expect("positions is never empty");
            positions.push((px + shift.dx, py + shift.dy));
        }

        let min_x = positions.iter().map(|p| p.0).min().expect("non-empty");
        let max_x = positions.iter().map(|p| p.0).max().expect("non-empty");
        let min_y = positions.iter().map(|p| p.1).min().expect("non-empty");
        let max_y = positions.iter().map(|p| p.1).max().expect("non-empty");

        let canvas_w = (max_x - min_x) as usize + w;
        let canvas_h = (max_y - min_y) as usize + h;
        debug!(canvas_w, canvas_h, frames = frames.len(), "Compositing canvas");

        let mut sum = Array2::<f32>::zeros((canvas_h, canvas_w));
        let mut count = Array2::<f32>::zeros((canvas_h, canvas_w));

        for (frame, &(px, py)) in frames.iter().zip(&positions) {
            let ox = (px - min_x) as usize;
            let oy = (py - min_y) as usize;
            for row in 0..h {
                for col in 0..w {
                    sum[[oy + row, ox + col]] += frame.data[[row, col]];
                    count[[oy + row, ox + col]] += 1.0;
                }
            }
        }

        // Overlaps average out; uncovered canvas stays black.
        let mut composed = sum;
        composed.zip_mut_with(&count, |s, &c| {
            if c > 0.0 {
                *s /= c;
            }
        });

        StitchOutcome::Success(Frame::new(composed, frames[0].original_bit_depth))
    }
}
