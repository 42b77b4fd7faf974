use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::gif;

#[derive(Args)]
pub struct InfoArgs {
    /// Input GIF file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let sequence = gif::load_gif(&args.file)?;
    let first = sequence.frame(0)?;

    println!("File:          {}", args.file.display());
    println!("Frames:        {}", sequence.len());
    println!("Dimensions:    {}x{}", first.width(), first.height());
    println!(
        "Channels:      {}",
        match sequence.channels() {
            Some(1) => "grayscale",
            Some(3) => "RGB",
            _ => "unknown",
        }
    );

    let durations = sequence.durations_ms();
    let min = durations.iter().min().copied().unwrap_or(0);
    let max = durations.iter().max().copied().unwrap_or(0);
    let total: u64 = durations.iter().map(|&d| d as u64).sum();
    println!(
        "Frame delay:   {} ms avg ({min}-{max} ms)",
        sequence.average_duration_ms()
    );
    println!("Duration:      {:.2} s", total as f64 / 1000.0);

    Ok(())
}
