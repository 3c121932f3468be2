/// Minimum pixel count (h*w) to use band-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default edge length (in output pixels) of a processing tile.
pub const DEFAULT_TILE_SIZE: usize = 128;

/// Default upper bound on the number of source pixels a single source
/// window keeps materialized (per cached channel). 4 Mpx = 16 MB per
/// channel at f32.
pub const DEFAULT_WINDOW_BUDGET_PIXELS: usize = 4 * 1024 * 1024;

/// Default number of rendered preview tiles retained between requests.
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 64;

/// Catmull-Rom cubic convolution parameter.
pub const CATMULL_ROM_A: f64 = -0.5;

/// Slack added to the maximum displacement before rounding it up to a whole
/// pixel margin. Absorbs float error in per-pixel coordinate evaluation.
pub const MARGIN_SLACK: f64 = 1e-6;

/// Number of channels that are resampled (red and blue).
pub const SHIFTED_CHANNEL_COUNT: usize = 2;

/// Lower bound of the preview saturation adjustment, in percent.
pub const MIN_PREVIEW_SATURATION: f32 = -100.0;

/// Upper bound of the preview saturation adjustment, in percent.
pub const MAX_PREVIEW_SATURATION: f32 = 100.0;
