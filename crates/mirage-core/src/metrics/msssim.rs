use ndarray::Array2;

use crate::align::AlignedPair;
use crate::consts::MSSSIM_WEIGHTS;
use crate::error::{MirageError, Result};
use crate::metrics::ssim::luminance_contrast_maps;
use crate::metrics::MetricParams;

/// Multi-scale structural similarity over one aligned pair.
///
/// Contrast-structure terms are taken at every scale, the luminance term at
/// the coarsest, and combined as a weighted geometric mean. Scales are
/// produced by 2x2 average-pool downsampling. Computed per channel and
/// averaged. Range [0, 1] in practice, higher is better.
pub fn ms_ssim(pair: &AlignedPair, params: &MetricParams) -> Result<f64> {
    let scales = params.msssim_scales;
    if scales == 0 || scales > MSSSIM_WEIGHTS.len() {
        return Err(MirageError::Metric(format!(
            "MS-SSIM scale count must be 1..={}, got {scales}",
            MSSSIM_WEIGHTS.len()
        )));
    }
    if params.ssim_window < 3 {
        return Err(MirageError::Metric(format!(
            "SSIM window must be at least 3, got {}",
            params.ssim_window
        )));
    }

    let min_dim = pair.width().min(pair.height());
    if !scales_fit(min_dim, params.ssim_window, scales) {
        return Err(MirageError::FrameTooSmall {
            min_dim,
            scales,
            max_scales: max_feasible_scales(min_dim, params.ssim_window),
        });
    }

    // A reduced scale count renormalizes the weight prefix to sum 1.
    let weight_sum: f64 = MSSSIM_WEIGHTS[..scales].iter().sum();
    let weights: Vec<f64> = MSSSIM_WEIGHTS[..scales]
        .iter()
        .map(|w| w / weight_sum)
        .collect();

    let channels = pair.channels();
    let mut total = 0.0f64;
    for c in 0..channels {
        let x = pair.ground_truth().channel(c).to_owned();
        let y = pair.predicted().channel(c).to_owned();
        total += ms_ssim_planes(x, y, &weights, params.ssim_window, params.ssim_sigma)?;
    }
    Ok(total / channels as f64)
}

/// Largest scale count the frame supports for the given window, possibly 0.
pub fn max_feasible_scales(min_dim: usize, window: usize) -> usize {
    let mut scales = 0;
    while scales < MSSSIM_WEIGHTS.len() && scales_fit(min_dim, window, scales + 1) {
        scales += 1;
    }
    scales
}

/// The coarsest scale must still fit the window after scales-1 halvings.
fn scales_fit(min_dim: usize, window: usize, scales: usize) -> bool {
    min_dim > (window - 1) << (scales - 1)
}

fn ms_ssim_planes(
    x: Array2<f32>,
    y: Array2<f32>,
    weights: &[f64],
    window: usize,
    sigma: f32,
) -> Result<f64> {
    let mut cur_x = x;
    let mut cur_y = y;
    let mut result = 1.0f64;

    for (i, &weight) in weights.iter().enumerate() {
        let (l_map, cs_map) = luminance_contrast_maps(&cur_x.view(), &cur_y.view(), window, sigma)?;

        // Negative contrast terms are clamped before the geometric mean.
        if i + 1 == weights.len() {
            let mut ssim_map = l_map;
            ssim_map.zip_mut_with(&cs_map, |l, &cs| *l *= cs);
            result *= mean(&ssim_map).max(0.0).powf(weight);
        } else {
            result *= mean(&cs_map).max(0.0).powf(weight);
            cur_x = downsample2(&cur_x);
            cur_y = downsample2(&cur_y);
        }
    }
    Ok(result)
}

/// 2x2 average-pool downsample; trailing odd rows/columns are dropped.
fn downsample2(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let oh = h / 2;
    let ow = w / 2;

    let mut out = Array2::<f32>::zeros((oh, ow));
    for row in 0..oh {
        for col in 0..ow {
            out[[row, col]] = (data[[2 * row, 2 * col]]
                + data[[2 * row, 2 * col + 1]]
                + data[[2 * row + 1, 2 * col]]
                + data[[2 * row + 1, 2 * col + 1]])
                / 4.0;
        }
    }
    out
}

fn mean(map: &Array2<f32>) -> f64 {
    map.iter().map(|&v| v as f64).sum::<f64>() / map.len() as f64
}
