use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::consts::{
    COLOR_CHANNEL_COUNT, DEFAULT_FRAME_DURATION_MS, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R,
};
use crate::error::{MirageError, Result};

/// A single decoded image frame.
/// Pixel values are f32 in [0.0, 1.0], shape = (height, width, channels),
/// with 1 (grayscale) or 3 (RGB) channels. Frames are never mutated after
/// decode; every derived view is a fresh allocation.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width, channels)
    pub data: Array3<f32>,
    /// Original bit depth before normalization (8 for GIF sources)
    pub original_bit_depth: u8,
}

impl Frame {
    pub fn new(data: Array3<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
        }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// One channel plane as a 2D view.
    pub fn channel(&self, c: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(2), c)
    }

    /// Build a grayscale frame from packed 8-bit pixels, row-major.
    pub fn from_luma8(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(MirageError::InvalidDimensions { width, height });
        }
        let mut data = Array3::<f32>::zeros((height, width, 1));
        for row in 0..height {
            for col in 0..width {
                data[[row, col, 0]] = pixels[row * width + col] as f32 / 255.0;
            }
        }
        Ok(Self::new(data, 8))
    }

    /// Build an RGB frame from packed 8-bit RGB pixels, row-major.
    pub fn from_rgb8(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        if pixels.len() != width * height * COLOR_CHANNEL_COUNT {
            return Err(MirageError::InvalidDimensions { width, height });
        }
        let mut data = Array3::<f32>::zeros((height, width, COLOR_CHANNEL_COUNT));
        for row in 0..height {
            for col in 0..width {
                let base = (row * width + col) * COLOR_CHANNEL_COUNT;
                for c in 0..COLOR_CHANNEL_COUNT {
                    data[[row, col, c]] = pixels[base + c] as f32 / 255.0;
                }
            }
        }
        Ok(Self::new(data, 8))
    }

    /// Pack into 8-bit RGB bytes, promoting grayscale by replication.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let (h, w, ch) = self.data.dim();
        let mut out = Vec::with_capacity(h * w * COLOR_CHANNEL_COUNT);
        for row in 0..h {
            for col in 0..w {
                for c in 0..COLOR_CHANNEL_COUNT {
                    let src = if ch == 1 { 0 } else { c };
                    let v = (self.data[[row, col, src]].clamp(0.0, 1.0) * 255.0).round() as u8;
                    out.push(v);
                }
            }
        }
        out
    }

    /// Luminance plane using ITU-R BT.601 weights (identity for grayscale).
    pub fn luminance(&self) -> Array2<f32> {
        let (h, w, ch) = self.data.dim();
        if ch == 1 {
            return self.channel(0).to_owned();
        }
        let mut lum = Array2::<f32>::zeros((h, w));
        for row in 0..h {
            for col in 0..w {
                lum[[row, col]] = LUMINANCE_R * self.data[[row, col, 0]]
                    + LUMINANCE_G * self.data[[row, col, 1]]
                    + LUMINANCE_B * self.data[[row, col, 2]];
            }
        }
        lum
    }

    /// Promote to 3 channels by replicating the grayscale plane.
    /// Already-RGB frames are returned as a plain clone.
    pub fn to_rgb(&self) -> Frame {
        let (h, w, ch) = self.data.dim();
        if ch == COLOR_CHANNEL_COUNT {
            return self.clone();
        }
        let mut data = Array3::<f32>::zeros((h, w, COLOR_CHANNEL_COUNT));
        for row in 0..h {
            for col in 0..w {
                let v = self.data[[row, col, 0]];
                for c in 0..COLOR_CHANNEL_COUNT {
                    data[[row, col, c]] = v;
                }
            }
        }
        Frame::new(data, self.original_bit_depth)
    }
}

/// An ordered list of frames plus per-frame display durations inherited from
/// the source GIF timing. The engine never alters durations.
///
/// Invariant: all frames share one channel count. Spatial dimensions may
/// differ between frames of one sequence.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    frames: Vec<Frame>,
    durations_ms: Vec<u32>,
}

impl Sequence {
    /// Build a sequence from frames and matching per-frame durations.
    pub fn new(frames: Vec<Frame>, durations_ms: Vec<u32>) -> Result<Self> {
        if frames.len() != durations_ms.len() {
            return Err(MirageError::InvalidSequence(format!(
                "{} frames but {} durations",
                frames.len(),
                durations_ms.len()
            )));
        }
        validate_channels(&frames)?;
        Ok(Self {
            frames,
            durations_ms,
        })
    }

    /// Build a sequence with the default per-frame duration.
    pub fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        let durations = vec![DEFAULT_FRAME_DURATION_MS; frames.len()];
        Self::new(frames, durations)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn durations_ms(&self) -> &[u32] {
        &self.durations_ms
    }

    pub fn frame(&self, index: usize) -> Result<&Frame> {
        self.frames
            .get(index)
            .ok_or(MirageError::FrameIndexOutOfRange {
                index,
                total: self.frames.len(),
            })
    }

    pub fn duration_ms(&self, index: usize) -> u32 {
        self.durations_ms
            .get(index)
            .copied()
            .unwrap_or(DEFAULT_FRAME_DURATION_MS)
    }

    pub fn average_duration_ms(&self) -> u32 {
        if self.durations_ms.is_empty() {
            return DEFAULT_FRAME_DURATION_MS;
        }
        let sum: u64 = self.durations_ms.iter().map(|&d| d as u64).sum();
        (sum / self.durations_ms.len() as u64) as u32
    }

    /// Channel count shared by all frames, `None` for an empty sequence.
    pub fn channels(&self) -> Option<usize> {
        self.frames.first().map(Frame::channels)
    }

    /// Append a frame, enforcing the uniform channel-count invariant.
    pub fn push(&mut self, frame: Frame, duration_ms: u32) -> Result<()> {
        if let Some(ch) = self.channels() {
            if frame.channels() != ch {
                return Err(MirageError::InvalidSequence(format!(
                    "frame has {} channels, sequence has {}",
                    frame.channels(),
                    ch
                )));
            }
        } else {
            validate_channels(std::slice::from_ref(&frame))?;
        }
        self.frames.push(frame);
        self.durations_ms.push(duration_ms);
        Ok(())
    }
}

fn validate_channels(frames: &[Frame]) -> Result<()> {
    let Some(first) = frames.first() else {
        return Ok(());
    };
    let ch = first.channels();
    if ch != 1 && ch != COLOR_CHANNEL_COUNT {
        return Err(MirageError::InvalidSequence(format!(
            "unsupported channel count: {ch}"
        )));
    }
    for (i, frame) in frames.iter().enumerate() {
        if frame.channels() != ch {
            return Err(MirageError::InvalidSequence(format!(
                "frame {i} has {} channels, expected {ch}",
                frame.channels()
            )));
        }
    }
    Ok(())
}
