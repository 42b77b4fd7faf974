use ndarray::Array3;
use tracing::debug;

use crate::error::{MirageError, Result};
use crate::frame::{Frame, Sequence};

/// One ground-truth/predicted frame pair with identical width, height and
/// channel count, ready for metric computation and compositing.
///
/// Pairs are only produced by [`align`] (or [`AlignedPair::from_frames`] for
/// a single pair), which is what guarantees the matching geometry.
#[derive(Clone, Debug)]
pub struct AlignedPair {
    ground_truth: Frame,
    predicted: Frame,
    index: usize,
    duration_ms: u32,
}

impl AlignedPair {
    pub fn ground_truth(&self) -> &Frame {
        &self.ground_truth
    }

    pub fn predicted(&self) -> &Frame {
        &self.predicted
    }

    /// Position of this pair within the aligned sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Display duration inherited from the ground-truth frame.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn width(&self) -> usize {
        self.ground_truth.width()
    }

    pub fn height(&self) -> usize {
        self.ground_truth.height()
    }

    pub fn channels(&self) -> usize {
        self.ground_truth.channels()
    }

    /// Align a single frame pair outside of any sequence, applying the same
    /// channel-promotion and resampling policy as [`align`].
    pub fn from_frames(ground_truth: &Frame, predicted: &Frame) -> Result<AlignedPair> {
        reconcile(
            ground_truth,
            predicted,
            0,
            crate::consts::DEFAULT_FRAME_DURATION_MS,
        )
    }
}

/// Reconcile two sequences into an ordered list of aligned pairs.
///
/// The pairing is truncated to the shorter sequence (the engine never invents
/// frames). Per pair, a grayscale frame facing an RGB frame is promoted to 3
/// channels by replication, and the predicted frame is resampled to the
/// ground-truth frame's dimensions.
pub fn align(ground_truth: &Sequence, predicted: &Sequence) -> Result<Vec<AlignedPair>> {
    if ground_truth.is_empty() || predicted.is_empty() {
        return Err(MirageError::EmptySequence);
    }

    let len = ground_truth.len().min(predicted.len());
    let pairs: Vec<AlignedPair> = (0..len)
        .map(|i| {
            reconcile(
                ground_truth.frame(i)?,
                predicted.frame(i)?,
                i,
                ground_truth.duration_ms(i),
            )
        })
        .collect::<Result<_>>()?;

    debug!(
        pairs = len,
        truth_frames = ground_truth.len(),
        predicted_frames = predicted.len(),
        "Aligned sequences"
    );
    Ok(pairs)
}

fn reconcile(
    ground_truth: &Frame,
    predicted: &Frame,
    index: usize,
    duration_ms: u32,
) -> Result<AlignedPair> {
    if ground_truth.width() == 0 || ground_truth.height() == 0 {
        return Err(MirageError::InvalidDimensions {
            width: ground_truth.width(),
            height: ground_truth.height(),
        });
    }
    if predicted.width() == 0 || predicted.height() == 0 {
        return Err(MirageError::InvalidDimensions {
            width: predicted.width(),
            height: predicted.height(),
        });
    }

    // Promote the grayscale side; RGB channels are never dropped.
    let (gt, mut pred) = if ground_truth.channels() == predicted.channels() {
        (ground_truth.clone(), predicted.clone())
    } else {
        (ground_truth.to_rgb(), predicted.to_rgb())
    };

    if pred.width() != gt.width() || pred.height() != gt.height() {
        pred = resample(&pred, gt.width(), gt.height())?;
    }

    Ok(AlignedPair {
        ground_truth: gt,
        predicted: pred,
        index,
        duration_ms,
    })
}

/// Resample a frame to the target dimensions.
///
/// Area-averaging when neither dimension grows, bilinear otherwise. Both are
/// deterministic, so pairing the same inputs always yields the same pixels.
pub fn resample(frame: &Frame, width: usize, height: usize) -> Result<Frame> {
    if width == 0 || height == 0 {
        return Err(MirageError::InvalidDimensions { width, height });
    }
    if frame.width() == width && frame.height() == height {
        return Ok(frame.clone());
    }

    let data = if width <= frame.width() && height <= frame.height() {
        resample_area(&frame.data, width, height)
    } else {
        resample_bilinear(&frame.data, width, height)
    };
    Ok(Frame::new(data, frame.original_bit_depth))
}

/// Box-filter downscale: every destination pixel is the coverage-weighted
/// mean of the source pixels its footprint spans.
fn resample_area(data: &Array3<f32>, dst_w: usize, dst_h: usize) -> Array3<f32> {
    let (src_h, src_w, channels) = data.dim();
    let scale_x = src_w as f32 / dst_w as f32;
    let scale_y = src_h as f32 / dst_h as f32;

    let mut out = Array3::<f32>::zeros((dst_h, dst_w, channels));
    for dy in 0..dst_h {
        let y0 = dy as f32 * scale_y;
        let y1 = (dy + 1) as f32 * scale_y;
        let row_start = y0.floor() as usize;
        let row_end = (y1.ceil() as usize).min(src_h);

        for dx in 0..dst_w {
            let x0 = dx as f32 * scale_x;
            let x1 = (dx + 1) as f32 * scale_x;
            let col_start = x0.floor() as usize;
            let col_end = (x1.ceil() as usize).min(src_w);

            for c in 0..channels {
                let mut sum = 0.0f32;
                let mut weight = 0.0f32;
                for row in row_start..row_end {
                    let wy = (y1.min((row + 1) as f32) - y0.max(row as f32)).max(0.0);
                    for col in col_start..col_end {
                        let wx = (x1.min((col + 1) as f32) - x0.max(col as f32)).max(0.0);
                        sum += data[[row, col, c]] * wy * wx;
                        weight += wy * wx;
                    }
                }
                out[[dy, dx, c]] = if weight > 0.0 { sum / weight } else { 0.0 };
            }
        }
    }
    out
}

/// Bilinear upscale, sampling at pixel centers with edge clamping.
fn resample_bilinear(data: &Array3<f32>, dst_w: usize, dst_h: usize) -> Array3<f32> {
    let (src_h, src_w, channels) = data.dim();
    let scale_x = src_w as f32 / dst_w as f32;
    let scale_y = src_h as f32 / dst_h as f32;

    let mut out = Array3::<f32>::zeros((dst_h, dst_w, channels));
    for dy in 0..dst_h {
        let sy = ((dy as f32 + 0.5) * scale_y - 0.5).clamp(0.0, (src_h - 1) as f32);
        let row0 = sy.floor() as usize;
        let row1 = (row0 + 1).min(src_h - 1);
        let fy = sy - row0 as f32;

        for dx in 0..dst_w {
            let sx = ((dx as f32 + 0.5) * scale_x - 0.5).clamp(0.0, (src_w - 1) as f32);
            let col0 = sx.floor() as usize;
            let col1 = (col0 + 1).min(src_w - 1);
            let fx = sx - col0 as f32;

            for c in 0..channels {
                let top = data[[row0, col0, c]] * (1.0 - fx) + data[[row0, col1, c]] * fx;
                let bottom = data[[row1, col0, c]] * (1.0 - fx) + data[[row1, col1, c]] * fx;
                out[[dy, dx, c]] = top * (1.0 - fy) + bottom * fy;
            }
        }
    }
    out
}
