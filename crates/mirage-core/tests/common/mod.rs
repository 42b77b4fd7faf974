use ndarray::Array3;

use mirage_core::align::AlignedPair;
use mirage_core::frame::{Frame, Sequence};

/// Build a frame filled with one value.
pub fn solid_frame(width: usize, height: usize, channels: usize, value: f32) -> Frame {
    Frame::new(Array3::from_elem((height, width, channels), value), 8)
}

/// Build a frame with a diagonal gradient, useful where flat frames would
/// degenerate windowed statistics.
pub fn gradient_frame(width: usize, height: usize, channels: usize) -> Frame {
    let mut data = Array3::<f32>::zeros((height, width, channels));
    for row in 0..height {
        for col in 0..width {
            for c in 0..channels {
                data[[row, col, c]] = ((row + col) % 256) as f32 / 255.0;
            }
        }
    }
    Frame::new(data, 8)
}

/// Deterministic pseudo-random frame (LCG, seeded).
pub fn noise_frame(width: usize, height: usize, channels: usize, seed: u32) -> Frame {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let mut data = Array3::<f32>::zeros((height, width, channels));
    for row in 0..height {
        for col in 0..width {
            for c in 0..channels {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                data[[row, col, c]] = (state >> 16) as f32 / 65_535.0;
            }
        }
    }
    Frame::new(data, 8)
}

/// Align two single frames into a pair.
pub fn pair_of(ground_truth: &Frame, predicted: &Frame) -> AlignedPair {
    AlignedPair::from_frames(ground_truth, predicted).expect("alignable pair")
}

/// Wrap frames into a sequence with default durations.
pub fn sequence_of(frames: Vec<Frame>) -> Sequence {
    Sequence::from_frames(frames).expect("valid sequence")
}
