pub mod msssim;
pub mod perceptual;
pub mod pixelwise;
pub mod ssim;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::align::AlignedPair;
use crate::consts::{MSSSIM_DEFAULT_SCALES, SSIM_SIGMA, SSIM_WINDOW};
use crate::error::{MirageError, Result};

/// A supported similarity/error metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Mse,
    Mae,
    Psnr,
    Ssim,
    MsSsim,
    Lpips,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Mse,
        MetricKind::Mae,
        MetricKind::Psnr,
        MetricKind::Ssim,
        MetricKind::MsSsim,
        MetricKind::Lpips,
    ];

    /// Which way "better" points when ranking candidates.
    ///
    /// Kept as an explicit table so a new metric cannot be silently
    /// misranked from its name.
    pub fn direction(&self) -> Direction {
        match self {
            MetricKind::Mse => Direction::LowerIsBetter,
            MetricKind::Mae => Direction::LowerIsBetter,
            MetricKind::Psnr => Direction::HigherIsBetter,
            MetricKind::Ssim => Direction::HigherIsBetter,
            MetricKind::MsSsim => Direction::HigherIsBetter,
            MetricKind::Lpips => Direction::LowerIsBetter,
        }
    }
}

/// Ranking order for a metric: ascending for error metrics, descending for
/// similarity metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Mse => "mse",
            MetricKind::Mae => "mae",
            MetricKind::Psnr => "psnr",
            MetricKind::Ssim => "ssim",
            MetricKind::MsSsim => "ms-ssim",
            MetricKind::Lpips => "lpips",
        };
        write!(f, "{name}")
    }
}

impl FromStr for MetricKind {
    type Err = MirageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mse" => Ok(MetricKind::Mse),
            "mae" => Ok(MetricKind::Mae),
            "psnr" => Ok(MetricKind::Psnr),
            "ssim" => Ok(MetricKind::Ssim),
            "ms-ssim" | "msssim" => Ok(MetricKind::MsSsim),
            "lpips" => Ok(MetricKind::Lpips),
            other => Err(MirageError::UnknownMetric(other.to_string())),
        }
    }
}

/// Tuning parameters for the windowed metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricParams {
    /// SSIM window side length (odd).
    pub ssim_window: usize,
    /// Sigma of the Gaussian weighting inside the SSIM window.
    pub ssim_sigma: f32,
    /// Number of MS-SSIM scales (1..=5).
    pub msssim_scales: usize,
}

impl Default for MetricParams {
    fn default() -> Self {
        Self {
            ssim_window: SSIM_WINDOW,
            ssim_sigma: SSIM_SIGMA,
            msssim_scales: MSSSIM_DEFAULT_SCALES,
        }
    }
}

/// Score a single aligned pair with the given metric.
///
/// Pure apart from the perceptual kind, which consults the process-wide
/// scorer installed via [`perceptual::install`].
pub fn score_pair(kind: MetricKind, pair: &AlignedPair, params: &MetricParams) -> Result<f64> {
    match kind {
        MetricKind::Mse => Ok(pixelwise::mse(pair)),
        MetricKind::Mae => Ok(pixelwise::mae(pair)),
        MetricKind::Psnr => Ok(pixelwise::psnr(pair)),
        MetricKind::Ssim => ssim::ssim(pair, params),
        MetricKind::MsSsim => msssim::ms_ssim(pair, params),
        MetricKind::Lpips => perceptual::score(pair),
    }
}
