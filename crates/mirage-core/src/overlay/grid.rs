use crate::frame::Frame;
use crate::overlay::OverlayConfig;

/// Draw grid lines over a rendered overlay frame.
///
/// Lines run every `grid_size` pixels, `grid_thickness` wide, alpha-blended
/// at `grid_opacity`. Applied after mode compositing so the grid sits on top
/// regardless of mode.
pub fn apply(frame: &mut Frame, config: &OverlayConfig) {
    let (h, w, channels) = frame.data.dim();
    let spacing = config.grid_size;
    if spacing == 0 {
        return;
    }
    let thickness = config.grid_thickness.max(1);
    let alpha = config.grid_opacity.clamp(0.0, 1.0);

    // Vertical lines
    for x in (0..w).step_by(spacing) {
        let x_end = (x + thickness).min(w);
        for row in 0..h {
            for col in x..x_end {
                for c in 0..channels {
                    let v = frame.data[[row, col, c]];
                    frame.data[[row, col, c]] = v * (1.0 - alpha) + config.grid_color[c] * alpha;
                }
            }
        }
    }

    // Horizontal lines
    for y in (0..h).step_by(spacing) {
        let y_end = (y + thickness).min(h);
        for row in y..y_end {
            for col in 0..w {
                for c in 0..channels {
                    let v = frame.data[[row, col, c]];
                    frame.data[[row, col, c]] = v * (1.0 - alpha) + config.grid_color[c] * alpha;
                }
            }
        }
    }
}
