use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use mirage_core::align::align;
use mirage_core::overlay::{composite, export_overlay_sequence, HeatmapScale, VisualizationMode};

use crate::config::ToolConfig;
use crate::gif;

#[derive(Args)]
pub struct OverlayArgs {
    /// Ground-truth GIF
    pub ground_truth: PathBuf,

    /// Predicted GIF
    pub predicted: PathBuf,

    /// Visualization mode: side-by-side, blend, difference, ssim-map,
    /// dual-color, flicker or checkerboard
    #[arg(long)]
    pub mode: String,

    /// Output file (GIF, or PNG with --frame)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Export a single frame as PNG instead of the whole sequence
    #[arg(long)]
    pub frame: Option<usize>,

    /// Blend: predicted weight in [0, 1]
    #[arg(long)]
    pub blend_ratio: Option<f32>,

    /// Checkerboard: tile side length in pixels
    #[arg(long)]
    pub checker_size: Option<usize>,

    /// Flicker: frames each source stays visible
    #[arg(long)]
    pub flicker_period: Option<usize>,

    /// Difference: fixed normalization maximum instead of per-frame auto
    #[arg(long)]
    pub heatmap_max: Option<f32>,

    /// Grid line spacing in pixels (0 disables)
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Grid color as "r,g,b" with 0-255 components
    #[arg(long)]
    pub grid_color: Option<String>,

    /// Grid opacity in [0, 1]
    #[arg(long)]
    pub grid_opacity: Option<f32>,

    /// Grid line thickness in pixels
    #[arg(long)]
    pub grid_thickness: Option<usize>,

    /// TOML config with overlay defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &OverlayArgs) -> Result<()> {
    let tool_config = ToolConfig::load_or_default(args.config.as_deref())?;
    let mut overlay = tool_config.overlay;

    overlay.mode = args.mode.parse::<VisualizationMode>()?;
    if let Some(ratio) = args.blend_ratio {
        overlay.blend_ratio = ratio;
    }
    if let Some(size) = args.checker_size {
        overlay.checker_size = size;
    }
    if let Some(period) = args.flicker_period {
        overlay.flicker_period = period;
    }
    if let Some(max) = args.heatmap_max {
        overlay.heatmap_scale = HeatmapScale::Fixed(max);
    }
    if let Some(size) = args.grid_size {
        overlay.grid_size = size;
    }
    if let Some(ref color) = args.grid_color {
        overlay.grid_color = parse_rgb(color)?;
    }
    if let Some(opacity) = args.grid_opacity {
        overlay.grid_opacity = opacity;
    }
    if let Some(thickness) = args.grid_thickness {
        overlay.grid_thickness = thickness;
    }

    let truth = gif::load_gif(&args.ground_truth)?;
    let predicted = gif::load_gif(&args.predicted)?;
    let pairs = align(&truth, &predicted)?;

    match args.frame {
        Some(index) => {
            let Some(pair) = pairs.get(index) else {
                bail!("frame {index} out of range (aligned pairs: {})", pairs.len());
            };
            let rendered = composite(pair, &overlay)?;
            gif::save_png(&args.output, &rendered)?;
            println!("Overlay frame {index} saved to {}", args.output.display());
        }
        None => {
            let rendered = export_overlay_sequence(&pairs, &overlay)?;
            gif::save_gif(&args.output, &rendered)?;
            println!(
                "Overlay ({}, {} frames) saved to {}",
                overlay.mode,
                rendered.len(),
                args.output.display()
            );
        }
    }
    Ok(())
}

fn parse_rgb(text: &str) -> Result<[f32; 3]> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        bail!("expected grid color as \"r,g,b\", got {text:?}");
    }
    let mut rgb = [0.0f32; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        let component: u8 = part
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid color component {part:?}"))?;
        *slot = component as f32 / 255.0;
    }
    Ok(rgb)
}
