pub mod grid;
pub mod modes;

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::align::AlignedPair;
use crate::consts::{DEFAULT_CHECKER_SIZE, PARALLEL_FRAME_THRESHOLD};
use crate::error::{MirageError, Result};
use crate::frame::{Frame, Sequence};

/// How one aligned pair is rendered into a single inspection frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationMode {
    /// Ground truth and predicted concatenated horizontally.
    SideBySide,
    /// `ratio * predicted + (1 - ratio) * truth`, pixelwise.
    Blend,
    /// Per-pixel absolute difference through a heatmap colormap.
    Difference,
    /// Local SSIM rendered green (similar) to red (different).
    SsimMap,
    /// Truth and predicted luminance tinted in separate hues and summed.
    DualColor,
    /// Whole-frame alternation; parity is supplied by the caller.
    Flicker,
    /// Alternating tiles from each source.
    Checkerboard,
}

impl fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VisualizationMode::SideBySide => "side-by-side",
            VisualizationMode::Blend => "blend",
            VisualizationMode::Difference => "difference",
            VisualizationMode::SsimMap => "ssim-map",
            VisualizationMode::DualColor => "dual-color",
            VisualizationMode::Flicker => "flicker",
            VisualizationMode::Checkerboard => "checkerboard",
        };
        write!(f, "{name}")
    }
}

impl FromStr for VisualizationMode {
    type Err = MirageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "side-by-side" => Ok(VisualizationMode::SideBySide),
            "blend" => Ok(VisualizationMode::Blend),
            "difference" | "heatmap" => Ok(VisualizationMode::Difference),
            "ssim-map" => Ok(VisualizationMode::SsimMap),
            "dual-color" => Ok(VisualizationMode::DualColor),
            "flicker" => Ok(VisualizationMode::Flicker),
            "checkerboard" => Ok(VisualizationMode::Checkerboard),
            other => Err(MirageError::UnknownMode(other.to_string())),
        }
    }
}

/// Normalization of the difference heatmap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatmapScale {
    /// Normalize by the frame's own maximum difference (logged per frame).
    Auto,
    /// Normalize by a caller-supplied maximum, comparable across frames.
    Fixed(f32),
}

/// One flat configuration record for every visualization mode.
///
/// Mode-specific knobs live side by side so that adding a mode is a data
/// change plus one rendering function, not a type-hierarchy change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub mode: VisualizationMode,
    /// Blend: predicted weight in [0, 1].
    pub blend_ratio: f32,
    /// Checkerboard: tile side length in pixels.
    pub checker_size: usize,
    /// Flicker: frames each source stays visible during sequence export.
    pub flicker_period: usize,
    /// Flicker: parity for a single call; false shows the ground truth.
    pub flicker_phase: bool,
    pub heatmap_scale: HeatmapScale,
    /// Dual-color: RGB tint for the ground truth (default green).
    pub truth_tint: [f32; 3],
    /// Dual-color: RGB tint for the prediction (default magenta).
    pub predicted_tint: [f32; 3],
    /// Grid line spacing in pixels; 0 disables the grid.
    pub grid_size: usize,
    pub grid_color: [f32; 3],
    pub grid_opacity: f32,
    pub grid_thickness: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            mode: VisualizationMode::SideBySide,
            blend_ratio: 0.5,
            checker_size: DEFAULT_CHECKER_SIZE,
            flicker_period: 1,
            flicker_phase: false,
            heatmap_scale: HeatmapScale::Auto,
            truth_tint: [0.0, 1.0, 0.0],
            predicted_tint: [1.0, 0.0, 1.0],
            grid_size: 0,
            grid_color: [0.5, 0.5, 0.5],
            grid_opacity: 0.5,
            grid_thickness: 1,
        }
    }
}

impl OverlayConfig {
    pub fn with_mode(mode: VisualizationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Render one aligned pair under the configured mode.
///
/// Always produces a 3-channel frame. The grid overlay, when enabled, is
/// composited last, uniformly across all modes.
pub fn composite(pair: &AlignedPair, config: &OverlayConfig) -> Result<Frame> {
    if pair.width() == 0 || pair.height() == 0 {
        return Err(MirageError::Compositor(format!(
            "degenerate pair geometry: {}x{}",
            pair.width(),
            pair.height()
        )));
    }

    let mut frame = match config.mode {
        VisualizationMode::SideBySide => modes::side_by_side(pair),
        VisualizationMode::Blend => modes::blend(pair, config.blend_ratio),
        VisualizationMode::Difference => modes::difference(pair, config.heatmap_scale),
        VisualizationMode::SsimMap => modes::ssim_similarity(pair, config.heatmap_scale),
        VisualizationMode::DualColor => {
            modes::dual_color(pair, config.truth_tint, config.predicted_tint)
        }
        VisualizationMode::Flicker => modes::flicker(pair, config.flicker_phase),
        VisualizationMode::Checkerboard => modes::checkerboard(pair, config.checker_size)?,
    };

    if config.grid_size > 0 {
        grid::apply(&mut frame, config);
    }
    Ok(frame)
}

/// Render every aligned pair into a new sequence for export.
///
/// Durations are inherited from the pairs' ground-truth timing; flicker
/// parity is derived from the frame index and the configured period.
pub fn export_overlay_sequence(pairs: &[AlignedPair], config: &OverlayConfig) -> Result<Sequence> {
    if pairs.is_empty() {
        return Err(MirageError::EmptySequence);
    }

    let period = config.flicker_period.max(1);
    let render = |pair: &AlignedPair| -> Result<Frame> {
        let mut frame_config = config.clone();
        frame_config.flicker_phase = (pair.index() / period) % 2 == 1;
        composite(pair, &frame_config)
    };

    let frames: Result<Vec<Frame>> = if pairs.len() >= PARALLEL_FRAME_THRESHOLD {
        pairs.par_iter().map(render).collect()
    } else {
        pairs.iter().map(render).collect()
    };

    let durations = pairs.iter().map(AlignedPair::duration_ms).collect();
    Sequence::new(frames?, durations)
}
