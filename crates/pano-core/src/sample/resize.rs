use ndarray::Array2;

use crate::frame::Frame;

/// Downscale a frame to `target_width`, preserving aspect ratio.
///
/// New height = round(height · target_width / width). Uses area averaging
/// (each output pixel is the coverage-weighted mean of the source pixels it
/// spans), which is the appropriate kernel for downscaling. Frames at or
/// below the target width are returned unchanged.
pub fn resize_to_width(frame: &Frame, target_width: usize) -> Frame {
    let w = frame.width();
    let h = frame.height();
    if target_width == 0 || w <= target_width {
        return frame.clone();
    }

    let new_w = target_width;
    let new_h = ((h as f64 * new_w as f64 / w as f64).round() as usize).max(1);

    let data = area_average(&frame.data, new_h, new_w);
    let mut out = Frame::new(data, frame.original_bit_depth);
    out.metadata = frame.metadata.clone();
    out
}

/// Area-averaged resample of `src` to (new_h, new_w).
///
/// Output pixel (r, c) covers the source rectangle
/// [r·sy, (r+1)·sy) × [c·sx, (c+1)·sx); partially covered source pixels
/// contribute proportionally to their overlap.
fn area_average(src: &Array2<f32>, new_h: usize, new_w: usize) -> Array2<f32> {
    let (h, w) = src.dim();
    let sy = h as f64 / new_h as f64;
    let sx = w as f64 / new_w as f64;

    let mut out = Array2::<f32>::zeros((new_h, new_w));

    for row in 0..new_h {
        let y0 = row as f64 * sy;
        let y1 = ((row + 1) as f64 * sy).min(h as f64);

        for col in 0..new_w {
            let x0 = col as f64 * sx;
            let x1 = ((col + 1) as f64 * sx).min(w as f64);

            let mut sum = 0.0f64;
            let mut weight = 0.0f64;

            let mut iy = y0.floor() as usize;
            while (iy as f64) < y1 {
                let wy = overlap(y0, y1, iy);
                let mut ix = x0.floor() as usize;
                while (ix as f64) < x1 {
                    let wx = overlap(x0, x1, ix);
                    sum += src[[iy, ix]] as f64 * wy * wx;
                    weight += wy * wx;
                    ix += 1;
                }
                iy += 1;
            }

            out[[row, col]] = if weight > 0.0 { (sum / weight) as f32 } else { 0.0 };
        }
    }

    out
}

/// Length of the overlap between [a0, a1) and the unit span [i, i+1).
fn overlap(a0: f64, a1: f64, i: usize) -> f64 {
    let lo = a0.max(i as f64);
    let hi = a1.min(i as f64 + 1.0);
    (hi - lo).max(0.0)
}
