use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{PanoError, Result};
use crate::frame::Frame;

/// Translation between two frames, as measured by phase correlation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Shift {
    /// Horizontal offset of the target relative to the reference, in pixels.
    pub dx: i64,
    /// Vertical offset of the target relative to the reference, in pixels.
    pub dy: i64,
    /// Correlation peak height in [0, 1]; near 1 for a clean translation,
    /// near 0 when the frames share no structure.
    pub response: f32,
}

/// Measure the integer-pixel translation between two equally sized frames
/// using FFT phase correlation.
pub fn phase_correlate(reference: &Frame, target: &Frame) -> Result<Shift> {
    phase_correlate_array(&reference.data, &target.data)
}

pub fn phase_correlate_array(reference: &Array2<f32>, target: &Array2<f32>) -> Result<Shift> {
    let (h, w) = reference.dim();
    let (th, tw) = target.dim();
    if h != th || w != tw {
        return Err(PanoError::Pipeline(format!(
            "Frame size mismatch: {}x{} vs {}x{}",
            w, h, tw, th
        )));
    }
    if h == 0 || w == 0 {
        return Err(PanoError::Pipeline("Empty frame".into()));
    }

    // Hann window to reduce spectral leakage from non-periodic content
    let ref_fft = fft2d(&apply_hann(reference), false);
    let tgt_fft = fft2d(&apply_hann(target), false);

    // Normalized cross-power spectrum, then back to the spatial domain
    let cross = normalized_cross_power(&ref_fft, &tgt_fft);
    let correlation = fft2d_complex(&cross, true);

    let (peak_row, peak_col, peak_val) = find_peak(&correlation);

    // Peaks past the midpoint wrap around to negative offsets
    let dy = if peak_row > h / 2 {
        peak_row as i64 - h as i64
    } else {
        peak_row as i64
    };
    let dx = if peak_col > w / 2 {
        peak_col as i64 - w as i64
    } else {
        peak_col as i64
    };

    Ok(Shift {
        dx,
        dy,
        response: peak_val.clamp(0.0, 1.0),
    })
}

fn apply_hann(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut out = Array2::<f32>::zeros((h, w));

    for row in 0..h {
        let wy = 0.5 * (1.0 - (std::f32::consts::TAU * row as f32 / h as f32).cos());
        for col in 0..w {
            let wx = 0.5 * (1.0 - (std::f32::consts::TAU * col as f32 / w as f32).cos());
            out[[row, col]] = data[[row, col]] * wy * wx;
        }
    }

    out
}

/// 2D FFT of a real array: row-wise pass, then column-wise pass.
fn fft2d(data: &Array2<f32>, inverse: bool) -> Array2<Complex<f32>> {
    let complex = data.map(|&v| Complex::new(v, 0.0));
    fft2d_complex(&complex, inverse)
}

fn fft2d_complex(data: &Array2<Complex<f32>>, inverse: bool) -> Array2<Complex<f32>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = if inverse {
        planner.plan_fft_inverse(w)
    } else {
        planner.plan_fft_forward(w)
    };
    let fft_col = if inverse {
        planner.plan_fft_inverse(h)
    } else {
        planner.plan_fft_forward(h)
    };

    let mut work = data.clone();

    for row in 0..h {
        let mut row_data: Vec<Complex<f32>> = (0..w).map(|c| work[[row, c]]).collect();
        fft_row.process(&mut row_data);
        for col in 0..w {
            work[[row, col]] = row_data[col];
        }
    }

    for col in 0..w {
        let mut col_data: Vec<Complex<f32>> = (0..h).map(|r| work[[r, col]]).collect();
        fft_col.process(&mut col_data);
        for row in 0..h {
            work[[row, col]] = col_data[row];
        }
    }

    if inverse {
        let scale = 1.0 / (h * w) as f32;
        work.mapv_inplace(|v| v * scale);
    }

    work
}

fn normalized_cross_power(
    ref_fft: &Array2<Complex<f32>>,
    tgt_fft: &Array2<Complex<f32>>,
) -> Array2<Complex<f32>> {
    let (h, w) = ref_fft.dim();
    let mut out = Array2::<Complex<f32>>::zeros((h, w));

    for row in 0..h {
        for col in 0..w {
            let cross = ref_fft[[row, col]] * tgt_fft[[row, col]].conj();
            let mag = cross.norm();
            out[[row, col]] = if mag > 1e-12 {
                cross / mag
            } else {
                Complex::new(0.0, 0.0)
            };
        }
    }

    out
}

fn find_peak(correlation: &Array2<Complex<f32>>) -> (usize, usize, f32) {
    let (h, w) = correlation.dim();
    let mut best = (0usize, 0usize, f32::NEG_INFINITY);

    for row in 0..h {
        for col in 0..w {
            let val = correlation[[row, col]].re;
            if val > best.2 {
                best = (row, col, val);
            }
        }
    }

    best
}
