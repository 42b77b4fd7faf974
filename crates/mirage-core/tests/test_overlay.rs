mod common;

use approx::assert_abs_diff_eq;

use common::{gradient_frame, noise_frame, pair_of, sequence_of, solid_frame};
use mirage_core::align::align;
use mirage_core::error::MirageError;
use mirage_core::frame::Frame;
use mirage_core::overlay::{
    composite, export_overlay_sequence, HeatmapScale, OverlayConfig, VisualizationMode,
};

fn assert_frames_equal(a: &Frame, b: &Frame) {
    assert_eq!(a.data.dim(), b.data.dim());
    for (x, y) in a.data.iter().zip(b.data.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-6);
    }
}

#[test]
fn test_blend_endpoints_reproduce_the_sources() {
    let truth = gradient_frame(12, 12, 3);
    let predicted = noise_frame(12, 12, 3, 3);
    let pair = pair_of(&truth, &predicted);

    let mut config = OverlayConfig::with_mode(VisualizationMode::Blend);

    config.blend_ratio = 0.0;
    assert_frames_equal(&composite(&pair, &config).unwrap(), &truth);

    config.blend_ratio = 1.0;
    assert_frames_equal(&composite(&pair, &config).unwrap(), &predicted);
}

#[test]
fn test_side_by_side_concatenates_horizontally() {
    let truth = solid_frame(6, 4, 3, 0.25);
    let predicted = solid_frame(6, 4, 3, 0.75);
    let pair = pair_of(&truth, &predicted);

    let out = composite(
        &pair,
        &OverlayConfig::with_mode(VisualizationMode::SideBySide),
    )
    .unwrap();

    assert_eq!(out.width(), 12);
    assert_eq!(out.height(), 4);
    assert_abs_diff_eq!(out.data[[2, 1, 0]], 0.25, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[2, 7, 0]], 0.75, epsilon = 1e-6);
}

#[test]
fn test_checkerboard_alternates_tiles() {
    let truth = solid_frame(8, 8, 3, 0.0);
    let predicted = solid_frame(8, 8, 3, 1.0);
    let pair = pair_of(&truth, &predicted);

    let mut config = OverlayConfig::with_mode(VisualizationMode::Checkerboard);
    config.checker_size = 4;
    let out = composite(&pair, &config).unwrap();

    assert_abs_diff_eq!(out.data[[0, 0, 0]], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[0, 5, 0]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[5, 0, 0]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[5, 5, 0]], 0.0, epsilon = 1e-6);
}

#[test]
fn test_checkerboard_degenerates_to_one_source() {
    let truth = gradient_frame(8, 8, 3);
    let predicted = solid_frame(8, 8, 3, 1.0);
    let pair = pair_of(&truth, &predicted);

    let mut config = OverlayConfig::with_mode(VisualizationMode::Checkerboard);
    config.checker_size = 8;
    let out = composite(&pair, &config).unwrap();
    assert_frames_equal(&out, &truth);
}

#[test]
fn test_flicker_parity_selects_the_source() {
    let truth = solid_frame(4, 4, 3, 0.2);
    let predicted = solid_frame(4, 4, 3, 0.8);
    let pair = pair_of(&truth, &predicted);

    let mut config = OverlayConfig::with_mode(VisualizationMode::Flicker);
    config.flicker_phase = false;
    assert_frames_equal(&composite(&pair, &config).unwrap(), &truth);

    config.flicker_phase = true;
    assert_frames_equal(&composite(&pair, &config).unwrap(), &predicted);
}

#[test]
fn test_difference_of_identical_frames_is_cold() {
    let frame = gradient_frame(8, 8, 3);
    let pair = pair_of(&frame, &frame);

    let out = composite(
        &pair,
        &OverlayConfig::with_mode(VisualizationMode::Difference),
    )
    .unwrap();

    // Zero difference maps to the cold end of the colormap: pure blue.
    for row in 0..8 {
        for col in 0..8 {
            assert_abs_diff_eq!(out.data[[row, col, 0]], 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(out.data[[row, col, 1]], 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(out.data[[row, col, 2]], 1.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_difference_fixed_scale_maps_midpoint() {
    let truth = solid_frame(4, 4, 3, 0.0);
    let predicted = solid_frame(4, 4, 3, 0.5);
    let pair = pair_of(&truth, &predicted);

    let mut config = OverlayConfig::with_mode(VisualizationMode::Difference);
    config.heatmap_scale = HeatmapScale::Fixed(1.0);
    let out = composite(&pair, &config).unwrap();

    // t = 0.5: saturated red channel, full green, half blue.
    assert_abs_diff_eq!(out.data[[0, 0, 0]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[0, 0, 1]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[0, 0, 2]], 0.5, epsilon = 1e-6);
}

#[test]
fn test_ssim_map_of_identical_frames_is_green() {
    let frame = gradient_frame(16, 16, 3);
    let pair = pair_of(&frame, &frame);

    let out = composite(&pair, &OverlayConfig::with_mode(VisualizationMode::SsimMap)).unwrap();
    assert_abs_diff_eq!(out.data[[8, 8, 0]], 0.0, epsilon = 1e-4);
    assert_abs_diff_eq!(out.data[[8, 8, 1]], 1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(out.data[[8, 8, 2]], 0.0, epsilon = 1e-6);
}

#[test]
fn test_dual_color_tints_each_source() {
    let truth = solid_frame(4, 4, 1, 1.0);
    let predicted = solid_frame(4, 4, 1, 0.0);
    let pair = pair_of(&truth, &predicted);

    let out = composite(
        &pair,
        &OverlayConfig::with_mode(VisualizationMode::DualColor),
    )
    .unwrap();

    // Only the ground truth contributes: its default tint is green.
    assert_abs_diff_eq!(out.data[[0, 0, 0]], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[0, 0, 1]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[0, 0, 2]], 0.0, epsilon = 1e-6);
}

#[test]
fn test_grid_is_composited_on_top() {
    let truth = solid_frame(8, 8, 3, 0.0);
    let pair = pair_of(&truth, &truth);

    let mut config = OverlayConfig::with_mode(VisualizationMode::Blend);
    config.blend_ratio = 0.0;
    config.grid_size = 4;
    config.grid_color = [1.0, 0.0, 0.0];
    config.grid_opacity = 1.0;

    let out = composite(&pair, &config).unwrap();
    // On a line: fully replaced by the grid color.
    assert_abs_diff_eq!(out.data[[0, 2, 0]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data[[2, 4, 0]], 1.0, epsilon = 1e-6);
    // Off the lines: untouched.
    assert_abs_diff_eq!(out.data[[2, 2, 0]], 0.0, epsilon = 1e-6);
}

#[test]
fn test_unknown_mode_is_an_error() {
    assert!(matches!(
        "sparkle".parse::<VisualizationMode>(),
        Err(MirageError::UnknownMode(_))
    ));
    assert_eq!(
        "heatmap".parse::<VisualizationMode>().unwrap(),
        VisualizationMode::Difference
    );
}

#[test]
fn test_export_inherits_durations_and_flicker_parity() {
    let truth = mirage_core::frame::Sequence::new(
        vec![solid_frame(4, 4, 3, 0.2); 4],
        vec![30, 60, 90, 120],
    )
    .unwrap();
    let predicted = sequence_of(vec![solid_frame(4, 4, 3, 0.8); 4]);
    let pairs = align(&truth, &predicted).unwrap();

    let mut config = OverlayConfig::with_mode(VisualizationMode::Flicker);
    config.flicker_period = 1;
    let out = export_overlay_sequence(&pairs, &config).unwrap();

    assert_eq!(out.len(), 4);
    assert_eq!(out.durations_ms(), &[30, 60, 90, 120]);
    // Even indices show the ground truth, odd the prediction.
    assert_abs_diff_eq!(out.frames()[0].data[[0, 0, 0]], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(out.frames()[1].data[[0, 0, 0]], 0.8, epsilon = 1e-6);
    assert_abs_diff_eq!(out.frames()[2].data[[0, 0, 0]], 0.2, epsilon = 1e-6);
}

#[test]
fn test_export_of_no_pairs_is_an_error() {
    let config = OverlayConfig::default();
    assert!(matches!(
        export_overlay_sequence(&[], &config),
        Err(MirageError::EmptySequence)
    ));
}
