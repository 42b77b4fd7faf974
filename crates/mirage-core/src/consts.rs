/// Minimum aligned-pair count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// SSIM local-statistics window side length. Must be odd.
pub const SSIM_WINDOW: usize = 11;

/// Sigma of the Gaussian weighting applied inside the SSIM window.
pub const SSIM_SIGMA: f32 = 1.5;

/// SSIM stabilizing factor K1, giving C1 = (K1 * L)^2 with L = 1.0 since all
/// pixel values are normalized to [0, 1].
pub const SSIM_K1: f64 = 0.01;

/// SSIM stabilizing factor K2, giving C2 = (K2 * L)^2.
pub const SSIM_K2: f64 = 0.03;

/// Per-scale weights for MS-SSIM (Wang et al.), finest scale first.
pub const MSSSIM_WEIGHTS: [f64; 5] = [0.0448, 0.2856, 0.3001, 0.2363, 0.1333];

/// Default number of MS-SSIM scales.
pub const MSSSIM_DEFAULT_SCALES: usize = 5;

/// Frame display duration assumed when the source carries none (GIF
/// convention: a zero delay is rendered as 100 ms by most viewers).
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Default checkerboard tile side length in pixels.
pub const DEFAULT_CHECKER_SIZE: usize = 32;
