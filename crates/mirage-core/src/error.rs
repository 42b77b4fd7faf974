use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Metric error: {0}")]
    Metric(String),

    #[error("Frame too small for {scales}-scale MS-SSIM (min dimension {min_dim}, at most {max_scales} scales fit)")]
    FrameTooSmall {
        min_dim: usize,
        scales: usize,
        max_scales: usize,
    },

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Compositor error: {0}")]
    Compositor(String),

    #[error("Unknown visualization mode: {0}")]
    UnknownMode(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Comparison cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, MirageError>;
