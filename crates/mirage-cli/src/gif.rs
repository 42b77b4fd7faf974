use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, ImageFormat};

use mirage_core::consts::DEFAULT_FRAME_DURATION_MS;
use mirage_core::frame::{Frame, Sequence};

/// Decode a GIF into the engine's sequence form.
///
/// Frames are composited by the animation decoder and handed to the engine
/// as RGB; alpha is dropped since the engine models 1- or 3-channel frames.
/// Per-frame delays are kept in milliseconds, defaulting when the file
/// carries a zero delay.
pub fn load_gif(path: &Path) -> Result<Sequence> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let mut sequence = Sequence::default();
    for gif_frame in decoder.into_frames().collect_frames()? {
        let (numer, denom) = gif_frame.delay().numer_denom_ms();
        let mut duration_ms = if denom == 0 { 0 } else { numer / denom };
        if duration_ms == 0 {
            duration_ms = DEFAULT_FRAME_DURATION_MS;
        }

        let buffer = gif_frame.into_buffer();
        let (w, h) = buffer.dimensions();
        let rgb: Vec<u8> = buffer
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let frame = Frame::from_rgb8(w as usize, h as usize, &rgb)?;
        sequence.push(frame, duration_ms)?;
    }

    if sequence.is_empty() {
        bail!("GIF contains no frames: {}", path.display());
    }
    Ok(sequence)
}

/// Encode a sequence back into an animated GIF.
pub fn save_gif(path: &Path, sequence: &Sequence) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;

    for (frame, &duration_ms) in sequence.frames().iter().zip(sequence.durations_ms()) {
        let w = frame.width() as u32;
        let h = frame.height() as u32;

        let rgb = frame.to_rgb8();
        let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
        for px in rgb.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }

        let buffer = image::RgbaImage::from_raw(w, h, rgba)
            .expect("buffer size matches dimensions");
        let delay = Delay::from_numer_denom_ms(duration_ms, 1);
        encoder.encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))?;
    }
    Ok(())
}

/// Save a single frame as an 8-bit RGB PNG.
pub fn save_png(path: &Path, frame: &Frame) -> Result<()> {
    let w = frame.width() as u32;
    let h = frame.height() as u32;
    let img = image::RgbImage::from_raw(w, h, frame.to_rgb8())
        .expect("buffer size matches dimensions");
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::*;

    fn solid(width: usize, height: usize, value: f32) -> Frame {
        Frame::new(Array3::from_elem((height, width, 3), value), 8)
    }

    // Pixel values go through palette quantization, so the round trip only
    // asserts structure and timing, not exact colors.
    #[test]
    fn test_gif_round_trip_keeps_structure_and_timing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("roundtrip.gif");

        let mut sequence = Sequence::default();
        sequence.push(solid(16, 12, 0.2), 40).unwrap();
        sequence.push(solid(16, 12, 0.5), 80).unwrap();
        sequence.push(solid(16, 12, 0.8), 120).unwrap();

        save_gif(&path, &sequence).expect("encode GIF");
        let loaded = load_gif(&path).expect("decode GIF");

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.frame(0).unwrap().width(), 16);
        assert_eq!(loaded.frame(0).unwrap().height(), 12);
        assert_eq!(loaded.channels(), Some(3));
        assert_eq!(loaded.durations_ms(), &[40, 80, 120]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_gif(Path::new("/nonexistent/missing.gif")).is_err());
    }
}
