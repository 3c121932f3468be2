use serde::{Deserialize, Serialize};

use crate::consts::CATMULL_ROM_A;
use crate::frame::{Channel, Raster};

/// Pixel provider for the resampling kernels.
///
/// Coordinates passed to `read` are always inside
/// `0..raster_size().0` x `0..raster_size().1`; the kernels clamp before
/// reading.
pub trait PixelAccess {
    /// (width, height) of the underlying raster.
    fn raster_size(&self) -> (usize, usize);

    fn read(&self, x: usize, y: usize, channel: Channel) -> f32;
}

impl PixelAccess for Raster {
    fn raster_size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    fn read(&self, x: usize, y: usize, channel: Channel) -> f32 {
        match self.channel(channel) {
            Some(frame) => frame.data[[y, x]],
            None => 1.0,
        }
    }
}

/// Reconstruction kernel for fractional source coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    /// Nearest pixel. Fastest.
    Nearest,
    /// Bilinear over the 2x2 neighborhood.
    #[default]
    Linear,
    /// Catmull-Rom cubic convolution over the 4x4 neighborhood.
    Cubic,
}

impl Interpolation {
    /// Number of neighboring source pixels the kernel reads on each side.
    pub fn half_support(self) -> usize {
        match self {
            Interpolation::Nearest => 0,
            Interpolation::Linear => 1,
            Interpolation::Cubic => 2,
        }
    }

    /// Reconstruct `channel` at (x, y), clamped into [0, 1]. Reads outside
    /// the raster replicate the nearest edge pixel.
    pub fn sample<P: PixelAccess + ?Sized>(self, src: &P, x: f64, y: f64, channel: Channel) -> f32 {
        match self {
            Interpolation::Nearest => sample_nearest(src, x, y, channel),
            Interpolation::Linear => sample_linear(src, x, y, channel),
            Interpolation::Cubic => sample_cubic(src, x, y, channel),
        }
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interpolation::Nearest => write!(f, "Nearest"),
            Interpolation::Linear => write!(f, "Linear"),
            Interpolation::Cubic => write!(f, "Cubic"),
        }
    }
}

impl std::str::FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "none" => Ok(Interpolation::Nearest),
            "linear" | "bilinear" => Ok(Interpolation::Linear),
            "cubic" | "bicubic" => Ok(Interpolation::Cubic),
            other => Err(format!(
                "unknown interpolation '{other}' (expected nearest, linear or cubic)"
            )),
        }
    }
}

impl TryFrom<u8> for Interpolation {
    type Error = String;

    /// Legacy numeric codes: 0 = none, 1 = linear, 2 = cubic.
    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(Interpolation::Nearest),
            1 => Ok(Interpolation::Linear),
            2 => Ok(Interpolation::Cubic),
            other => Err(format!("interpolation code {other} out of range 0..=2")),
        }
    }
}

/// Clamp a (possibly negative) index into `0..len`. `len` must be > 0.
#[inline]
fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

pub fn sample_nearest<P: PixelAccess + ?Sized>(src: &P, x: f64, y: f64, channel: Channel) -> f32 {
    let (w, h) = src.raster_size();
    let xi = clamp_index(x.round() as i64, w);
    let yi = clamp_index(y.round() as i64, h);
    src.read(xi, yi, channel).clamp(0.0, 1.0)
}

pub fn sample_linear<P: PixelAccess + ?Sized>(src: &P, x: f64, y: f64, channel: Channel) -> f32 {
    let (w, h) = src.raster_size();

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let c0 = clamp_index(x0, w);
    let c1 = clamp_index(x0 + 1, w);
    let r0 = clamp_index(y0, h);
    let r1 = clamp_index(y0 + 1, h);

    let v00 = src.read(c0, r0, channel) as f64;
    let v10 = src.read(c1, r0, channel) as f64;
    let v01 = src.read(c0, r1, channel) as f64;
    let v11 = src.read(c1, r1, channel) as f64;

    let v = v00 * (1.0 - fx) * (1.0 - fy)
        + v10 * fx * (1.0 - fy)
        + v01 * (1.0 - fx) * fy
        + v11 * fx * fy;
    (v as f32).clamp(0.0, 1.0)
}

/// Catmull-Rom weights for taps at offsets -1, 0, +1, +2 from `floor(x)`,
/// given the fractional part `t` in [0, 1).
pub fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CATMULL_ROM_A;
    let t2 = t * t;
    let t3 = t2 * t;
    [
        a * t3 - 2.0 * a * t2 + a * t,
        (a + 2.0) * t3 - (a + 3.0) * t2 + 1.0,
        -(a + 2.0) * t3 + (2.0 * a + 3.0) * t2 - a * t,
        -a * t3 + a * t2,
    ]
}

pub fn sample_cubic<P: PixelAccess + ?Sized>(src: &P, x: f64, y: f64, channel: Channel) -> f32 {
    let (w, h) = src.raster_size();

    let xf = x.floor();
    let yf = y.floor();
    let wx = cubic_weights(x - xf);
    let wy = cubic_weights(y - yf);
    let xf = xf as i64;
    let yf = yf as i64;

    let cols = [
        clamp_index(xf - 1, w),
        clamp_index(xf, w),
        clamp_index(xf + 1, w),
        clamp_index(xf + 2, w),
    ];

    // Horizontal pass per row, then vertical over the four row results.
    let mut v = 0.0f64;
    for (dy, weight_y) in wy.iter().enumerate() {
        let row = clamp_index(yf - 1 + dy as i64, h);
        let mut acc = 0.0f64;
        for (col, weight_x) in cols.iter().zip(wx.iter()) {
            acc += src.read(*col, row, channel) as f64 * weight_x;
        }
        v += acc * weight_y;
    }
    (v as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_weights_sum_to_one() {
        for i in 0..10 {
            let t = i as f64 / 10.0;
            let sum: f64 = cubic_weights(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "t={t} sum={sum}");
        }
    }

    #[test]
    fn test_cubic_weights_at_zero_select_center_tap() {
        assert_eq!(cubic_weights(0.0), [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_legacy_interpolation_codes() {
        assert_eq!(Interpolation::try_from(0u8), Ok(Interpolation::Nearest));
        assert_eq!(Interpolation::try_from(2u8), Ok(Interpolation::Cubic));
        assert!(Interpolation::try_from(3u8).is_err());
    }
}
