use ndarray::{Array2, ArrayView2};

use crate::align::AlignedPair;
use crate::consts::{SSIM_K1, SSIM_K2};
use crate::error::{MirageError, Result};
use crate::metrics::MetricParams;

/// Single-scale structural similarity over one aligned pair.
///
/// Local means, variances and covariance are taken over a Gaussian-weighted
/// window (valid region only, no padding), per channel, then averaged across
/// channels. Range [-1, 1], higher is better.
pub fn ssim(pair: &AlignedPair, params: &MetricParams) -> Result<f64> {
    let channels = pair.channels();
    let mut total = 0.0f64;
    for c in 0..channels {
        let map = ssim_plane(
            &pair.ground_truth().channel(c),
            &pair.predicted().channel(c),
            params.ssim_window,
            params.ssim_sigma,
        )?;
        total += mean(&map);
    }
    Ok(total / channels as f64)
}

/// Full-resolution local-SSIM plane on luminance, for visualization.
///
/// The valid-region map is grown back to the frame size by edge replication
/// so the overlay compositor can render it pixel-for-pixel.
pub fn ssim_map(pair: &AlignedPair, params: &MetricParams) -> Result<Array2<f32>> {
    let gt = pair.ground_truth().luminance();
    let pred = pair.predicted().luminance();
    let map = ssim_plane(&gt.view(), &pred.view(), params.ssim_window, params.ssim_sigma)?;

    let (h, w) = gt.dim();
    let (mh, mw) = map.dim();
    let off_r = (h - mh) / 2;
    let off_c = (w - mw) / 2;

    let mut full = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let src_r = row.saturating_sub(off_r).min(mh - 1);
            let src_c = col.saturating_sub(off_c).min(mw - 1);
            full[[row, col]] = map[[src_r, src_c]];
        }
    }
    Ok(full)
}

/// Local SSIM map of two equally-shaped planes, valid region only.
///
/// The window shrinks to the largest odd size that fits a frame smaller than
/// the configured window; planes under 3 px on a side are a metric error.
pub fn ssim_plane(
    x: &ArrayView2<'_, f32>,
    y: &ArrayView2<'_, f32>,
    window: usize,
    sigma: f32,
) -> Result<Array2<f32>> {
    let (l_map, cs_map) = luminance_contrast_maps(x, y, window, sigma)?;
    let mut map = l_map;
    map.zip_mut_with(&cs_map, |l, &cs| *l *= cs);
    Ok(map)
}

/// Windowed luminance and contrast-structure terms of SSIM, valid region
/// only. MS-SSIM combines these across scales; plain SSIM is their product.
pub(crate) fn luminance_contrast_maps(
    x: &ArrayView2<'_, f32>,
    y: &ArrayView2<'_, f32>,
    window: usize,
    sigma: f32,
) -> Result<(Array2<f32>, Array2<f32>)> {
    let (h, w) = x.dim();
    let min_dim = h.min(w);
    if min_dim < 3 {
        return Err(MirageError::Metric(format!(
            "frame too small for SSIM: {w}x{h} (minimum 3x3)"
        )));
    }

    let win = effective_window(window, min_dim);
    let kernel = gaussian_kernel(win, sigma);

    let xx = x.mapv(|v| v * v);
    let yy = y.mapv(|v| v * v);
    let xy = {
        let mut prod = x.to_owned();
        prod.zip_mut_with(y, |a, &b| *a *= b);
        prod
    };

    let mu_x = filter_valid(x, &kernel);
    let mu_y = filter_valid(y, &kernel);
    let mu_xx = filter_valid(&xx.view(), &kernel);
    let mu_yy = filter_valid(&yy.view(), &kernel);
    let mu_xy = filter_valid(&xy.view(), &kernel);

    let c1 = (SSIM_K1 * SSIM_K1) as f32;
    let c2 = (SSIM_K2 * SSIM_K2) as f32;

    let (oh, ow) = mu_x.dim();
    let mut l_map = Array2::<f32>::zeros((oh, ow));
    let mut cs_map = Array2::<f32>::zeros((oh, ow));
    for row in 0..oh {
        for col in 0..ow {
            let mx = mu_x[[row, col]];
            let my = mu_y[[row, col]];
            let var_x = mu_xx[[row, col]] - mx * mx;
            let var_y = mu_yy[[row, col]] - my * my;
            let cov = mu_xy[[row, col]] - mx * my;

            l_map[[row, col]] = (2.0 * mx * my + c1) / (mx * mx + my * my + c1);
            cs_map[[row, col]] = (2.0 * cov + c2) / (var_x + var_y + c2);
        }
    }
    Ok((l_map, cs_map))
}

/// Largest odd window size that fits, at least 3.
fn effective_window(window: usize, min_dim: usize) -> usize {
    let mut win = window.min(min_dim).max(3);
    if win % 2 == 0 {
        win -= 1;
    }
    win
}

fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as f32;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel = vec![0.0f32; size];
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let d = i as f32 - radius;
        *k = (-d * d / s2).exp();
        sum += *k;
    }
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable windowed filter, valid extent only: output shape is
/// (h - win + 1, w - win + 1).
fn filter_valid(data: &ArrayView2<'_, f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let win = kernel.len();
    let ow = w - win + 1;
    let oh = h - win + 1;

    // Row pass
    let mut rows = Array2::<f32>::zeros((h, ow));
    for row in 0..h {
        for col in 0..ow {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                sum += data[[row, col + ki]] * kv;
            }
            rows[[row, col]] = sum;
        }
    }

    // Column pass
    let mut out = Array2::<f32>::zeros((oh, ow));
    for row in 0..oh {
        for col in 0..ow {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                sum += rows[[row + ki, col]] * kv;
            }
            out[[row, col]] = sum;
        }
    }
    out
}

fn mean(map: &Array2<f32>) -> f64 {
    let n = map.len();
    if n == 0 {
        return f64::NAN;
    }
    map.iter().map(|&v| v as f64).sum::<f64>() / n as f64
}
