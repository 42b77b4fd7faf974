mod common;

use approx::assert_abs_diff_eq;

use common::{gradient_frame, sequence_of, solid_frame};
use mirage_core::align::{align, resample, AlignedPair};
use mirage_core::error::MirageError;
use mirage_core::frame::Sequence;

#[test]
fn test_truncates_to_shorter_sequence() {
    let truth = sequence_of((0..5).map(|_| solid_frame(8, 8, 3, 0.5)).collect());
    let predicted = sequence_of((0..3).map(|_| solid_frame(8, 8, 3, 0.5)).collect());

    let pairs = align(&truth, &predicted).unwrap();
    assert_eq!(pairs.len(), 3);
    for (i, pair) in pairs.iter().enumerate() {
        assert_eq!(pair.index(), i);
    }
}

#[test]
fn test_empty_sequence_is_an_error() {
    let truth = sequence_of(vec![solid_frame(8, 8, 3, 0.5)]);
    let empty = Sequence::default();

    assert!(matches!(
        align(&truth, &empty),
        Err(MirageError::EmptySequence)
    ));
    assert!(matches!(
        align(&empty, &truth),
        Err(MirageError::EmptySequence)
    ));
}

#[test]
fn test_resamples_predicted_to_truth_dimensions() {
    let truth = sequence_of(vec![gradient_frame(10, 10, 3)]);
    let predicted = sequence_of(vec![gradient_frame(20, 20, 3)]);

    let pairs = align(&truth, &predicted).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].width(), 10);
    assert_eq!(pairs[0].height(), 10);
    assert_eq!(pairs[0].predicted().width(), 10);
    assert_eq!(pairs[0].predicted().height(), 10);
}

#[test]
fn test_upscales_smaller_prediction() {
    let truth = sequence_of(vec![gradient_frame(20, 20, 3)]);
    let predicted = sequence_of(vec![gradient_frame(10, 10, 3)]);

    let pairs = align(&truth, &predicted).unwrap();
    assert_eq!(pairs[0].predicted().width(), 20);
    assert_eq!(pairs[0].predicted().height(), 20);
}

#[test]
fn test_promotes_grayscale_to_rgb() {
    let truth = sequence_of(vec![solid_frame(8, 8, 3, 0.25)]);
    let predicted = sequence_of(vec![solid_frame(8, 8, 1, 0.75)]);

    let pairs = align(&truth, &predicted).unwrap();
    assert_eq!(pairs[0].channels(), 3);
    let pred = pairs[0].predicted();
    for c in 0..3 {
        assert_abs_diff_eq!(pred.data[[4, 4, c]], 0.75, epsilon = 1e-6);
    }
}

#[test]
fn test_area_downscale_averages_blocks() {
    // 4x4 frame of four constant 2x2 quadrants
    let mut frame = solid_frame(4, 4, 1, 0.0);
    for row in 0..2 {
        for col in 2..4 {
            frame.data[[row, col, 0]] = 1.0;
        }
    }
    for row in 2..4 {
        for col in 0..2 {
            frame.data[[row, col, 0]] = 0.5;
        }
    }

    let half = resample(&frame, 2, 2).unwrap();
    assert_abs_diff_eq!(half.data[[0, 0, 0]], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(half.data[[0, 1, 0]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(half.data[[1, 0, 0]], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(half.data[[1, 1, 0]], 0.0, epsilon = 1e-6);
}

#[test]
fn test_bilinear_upscale_preserves_flat_regions() {
    let frame = solid_frame(5, 5, 3, 0.42);
    let big = resample(&frame, 13, 11).unwrap();
    assert_eq!(big.width(), 13);
    assert_eq!(big.height(), 11);
    for v in big.data.iter() {
        assert_abs_diff_eq!(*v, 0.42, epsilon = 1e-6);
    }
}

#[test]
fn test_resample_identity_keeps_pixels() {
    let frame = gradient_frame(9, 7, 3);
    let same = resample(&frame, 9, 7).unwrap();
    for (a, b) in frame.data.iter().zip(same.data.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 0.0);
    }
}

#[test]
fn test_durations_follow_ground_truth() {
    let truth = Sequence::new(
        (0..3).map(|_| solid_frame(4, 4, 3, 0.5)).collect(),
        vec![40, 80, 120],
    )
    .unwrap();
    let predicted = sequence_of((0..3).map(|_| solid_frame(4, 4, 3, 0.5)).collect());

    let pairs = align(&truth, &predicted).unwrap();
    let durations: Vec<u32> = pairs.iter().map(|p| p.duration_ms()).collect();
    assert_eq!(durations, vec![40, 80, 120]);
}

#[test]
fn test_zero_dimension_frames_are_rejected() {
    let degenerate = solid_frame(0, 0, 3, 0.0);
    let ok = solid_frame(4, 4, 3, 0.0);
    assert!(matches!(
        AlignedPair::from_frames(&ok, &degenerate),
        Err(MirageError::InvalidDimensions { .. })
    ));
}
