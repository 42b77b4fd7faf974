use ndarray::{s, Array3};
use tracing::debug;

use crate::align::AlignedPair;
use crate::consts::{COLOR_CHANNEL_COUNT, EPSILON};
use crate::error::{MirageError, Result};
use crate::frame::Frame;
use crate::metrics::ssim;
use crate::metrics::MetricParams;
use crate::overlay::HeatmapScale;

/// Ground truth on the left, predicted on the right.
pub fn side_by_side(pair: &AlignedPair) -> Frame {
    let gt = pair.ground_truth().to_rgb();
    let pred = pair.predicted().to_rgb();
    let (h, w, _) = gt.data.dim();

    let mut out = Array3::<f32>::zeros((h, 2 * w, COLOR_CHANNEL_COUNT));
    out.slice_mut(s![.., ..w, ..]).assign(&gt.data);
    out.slice_mut(s![.., w.., ..]).assign(&pred.data);
    Frame::new(out, gt.original_bit_depth)
}

/// Pixelwise mix of the two sources; ratio 0 is pure ground truth,
/// ratio 1 pure prediction.
pub fn blend(pair: &AlignedPair, ratio: f32) -> Frame {
    let ratio = ratio.clamp(0.0, 1.0);
    let gt = pair.ground_truth().to_rgb();
    let pred = pair.predicted().to_rgb();

    let mut out = gt.data;
    out.zip_mut_with(&pred.data, |a, &b| *a = *a * (1.0 - ratio) + b * ratio);
    Frame::new(out, gt.original_bit_depth)
}

/// Absolute difference magnitude through a blue-green-yellow-red colormap.
pub fn difference(pair: &AlignedPair, scale: HeatmapScale) -> Frame {
    let a = &pair.ground_truth().data;
    let b = &pair.predicted().data;
    let (h, w, channels) = a.dim();

    let mut diff = Array3::<f32>::zeros((h, w, 1));
    let mut max_diff = 0.0f32;
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0.0f32;
            for c in 0..channels {
                sum += (a[[row, col, c]] - b[[row, col, c]]).abs();
            }
            let d = sum / channels as f32;
            diff[[row, col, 0]] = d;
            max_diff = max_diff.max(d);
        }
    }

    let norm = match scale {
        HeatmapScale::Auto => {
            if max_diff > 0.0 {
                max_diff
            } else {
                1.0
            }
        }
        HeatmapScale::Fixed(max) => max.max(EPSILON),
    };
    debug!(scale = norm, "Difference heatmap normalization");

    let mut out = Array3::<f32>::zeros((h, w, COLOR_CHANNEL_COUNT));
    for row in 0..h {
        for col in 0..w {
            let t = (diff[[row, col, 0]] / norm).clamp(0.0, 1.0);
            let [r, g, bl] = heatmap_rgb(t);
            out[[row, col, 0]] = r;
            out[[row, col, 1]] = g;
            out[[row, col, 2]] = bl;
        }
    }
    Frame::new(out, pair.ground_truth().original_bit_depth)
}

/// Local SSIM plane rendered green (similar) to red (different).
/// Falls back to the difference heatmap when the frame is too small for
/// windowed statistics.
pub fn ssim_similarity(pair: &AlignedPair, fallback_scale: HeatmapScale) -> Frame {
    let map = match ssim::ssim_map(pair, &MetricParams::default()) {
        Ok(map) => map,
        Err(_) => return difference(pair, fallback_scale),
    };
    let (h, w) = map.dim();

    let mut out = Array3::<f32>::zeros((h, w, COLOR_CHANNEL_COUNT));
    for row in 0..h {
        for col in 0..w {
            // Map values are in [-1, 1]; 1 means structurally identical.
            let n = ((map[[row, col]] + 1.0) / 2.0).clamp(0.0, 1.0);
            out[[row, col, 0]] = 1.0 - n;
            out[[row, col, 1]] = n;
        }
    }
    Frame::new(out, pair.ground_truth().original_bit_depth)
}

/// Each source's luminance in its own hue; overlap shows the combined color.
pub fn dual_color(pair: &AlignedPair, truth_tint: [f32; 3], predicted_tint: [f32; 3]) -> Frame {
    let gt_lum = pair.ground_truth().luminance();
    let pred_lum = pair.predicted().luminance();
    let (h, w) = gt_lum.dim();

    let mut out = Array3::<f32>::zeros((h, w, COLOR_CHANNEL_COUNT));
    for row in 0..h {
        for col in 0..w {
            for c in 0..COLOR_CHANNEL_COUNT {
                let v = gt_lum[[row, col]] * truth_tint[c] + pred_lum[[row, col]] * predicted_tint[c];
                out[[row, col, c]] = v.clamp(0.0, 1.0);
            }
        }
    }
    Frame::new(out, pair.ground_truth().original_bit_depth)
}

/// Whole-frame alternation; false parity shows the ground truth.
pub fn flicker(pair: &AlignedPair, phase: bool) -> Frame {
    if phase {
        pair.predicted().to_rgb()
    } else {
        pair.ground_truth().to_rgb()
    }
}

/// Alternating tiles; the (0,0) tile comes from the ground truth, so a tile
/// size covering the whole frame degenerates to the ground truth alone.
pub fn checkerboard(pair: &AlignedPair, tile_size: usize) -> Result<Frame> {
    if tile_size == 0 {
        return Err(MirageError::Compositor(
            "checkerboard tile size must be > 0".into(),
        ));
    }

    let gt = pair.ground_truth().to_rgb();
    let pred = pair.predicted().to_rgb();
    let (h, w, _) = gt.data.dim();

    let mut out = Array3::<f32>::zeros((h, w, COLOR_CHANNEL_COUNT));
    for row in 0..h {
        for col in 0..w {
            let source = if (row / tile_size + col / tile_size) % 2 == 0 {
                &gt
            } else {
                &pred
            };
            for c in 0..COLOR_CHANNEL_COUNT {
                out[[row, col, c]] = source.data[[row, col, c]];
            }
        }
    }
    Ok(Frame::new(out, gt.original_bit_depth))
}

/// Colormap used by the difference heatmap: blue at 0 through green and
/// yellow to red at 1.
fn heatmap_rgb(t: f32) -> [f32; 3] {
    [
        (t * 4.0).clamp(0.0, 1.0),
        (1.0 - (t - 0.5).abs() * 2.0).clamp(0.0, 1.0),
        (1.0 - t).clamp(0.0, 1.0),
    ]
}
