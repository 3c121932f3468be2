use ndarray::{s, Array2, ArrayViewMut2};
use serde::{Deserialize, Serialize};

use crate::error::{ChromaError, Result};
use crate::geom::Rect;

/// A single channel plane.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8 or 16)
    pub original_bit_depth: u8,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Color channel of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    /// The channels that are resampled. Green is the geometric reference and
    /// alpha always passes through.
    pub const SHIFTED: [Channel; 2] = [Channel::Red, Channel::Blue];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Red => write!(f, "Red"),
            Channel::Green => write!(f, "Green"),
            Channel::Blue => write!(f, "Blue"),
            Channel::Alpha => write!(f, "Alpha"),
        }
    }
}

/// Read-only pixel source handed to the engine by its host.
///
/// Implementors only need dimensions and a per-pixel accessor; `copy_rect`
/// has a default per-pixel implementation that bulk sources should
/// override.
pub trait SourceRaster: Sync {
    /// (width, height) in pixels.
    fn dimensions(&self) -> (usize, usize);

    /// Whether the source carries an alpha channel.
    fn has_alpha(&self) -> bool;

    /// Channel value at (x, y). Callers guarantee the coordinate is in
    /// bounds. Sources without alpha return 1.0 for `Channel::Alpha`.
    fn value(&self, x: usize, y: usize, channel: Channel) -> f32;

    /// Bit depth reported for output planes.
    fn bit_depth(&self) -> u8 {
        16
    }

    /// Copy `rect` of `channel` into `out` (shape = rect.height x rect.width).
    fn copy_rect(&self, channel: Channel, rect: Rect, mut out: ArrayViewMut2<f32>) {
        for row in 0..rect.height {
            for col in 0..rect.width {
                out[[row, col]] = self.value(rect.x + col, rect.y + row, channel);
            }
        }
    }
}

/// An RGB(A) image held as separate channel planes.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
    pub alpha: Option<Frame>,
}

impl Raster {
    /// Assemble a raster, checking that every plane has the same shape.
    pub fn new(red: Frame, green: Frame, blue: Frame, alpha: Option<Frame>) -> Result<Self> {
        let (h, w) = red.data.dim();
        for plane in [Some(&green), Some(&blue), alpha.as_ref()].into_iter().flatten() {
            let (ph, pw) = plane.data.dim();
            if ph != h || pw != w {
                return Err(ChromaError::ChannelMismatch {
                    expected_width: w,
                    expected_height: h,
                    width: pw,
                    height: ph,
                });
            }
        }
        Ok(Self {
            red,
            green,
            blue,
            alpha,
        })
    }

    /// A raster filled with a constant color. Mostly useful for tests and
    /// synthetic inputs.
    pub fn filled(width: usize, height: usize, rgb: [f32; 3], alpha: Option<f32>) -> Self {
        let plane = |v: f32| Frame::new(Array2::from_elem((height, width), v), 16);
        Self {
            red: plane(rgb[0]),
            green: plane(rgb[1]),
            blue: plane(rgb[2]),
            alpha: alpha.map(plane),
        }
    }

    pub fn width(&self) -> usize {
        self.green.width()
    }

    pub fn height(&self) -> usize {
        self.green.height()
    }

    pub fn channel(&self, channel: Channel) -> Option<&Frame> {
        match channel {
            Channel::Red => Some(&self.red),
            Channel::Green => Some(&self.green),
            Channel::Blue => Some(&self.blue),
            Channel::Alpha => self.alpha.as_ref(),
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> Option<&mut Frame> {
        match channel {
            Channel::Red => Some(&mut self.red),
            Channel::Green => Some(&mut self.green),
            Channel::Blue => Some(&mut self.blue),
            Channel::Alpha => self.alpha.as_mut(),
        }
    }
}

impl SourceRaster for Raster {
    fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    fn value(&self, x: usize, y: usize, channel: Channel) -> f32 {
        match self.channel(channel) {
            Some(frame) => frame.data[[y, x]],
            None => 1.0,
        }
    }

    fn bit_depth(&self) -> u8 {
        self.green.original_bit_depth
    }

    fn copy_rect(&self, channel: Channel, rect: Rect, mut out: ArrayViewMut2<f32>) {
        match self.channel(channel) {
            Some(frame) => out.assign(
                &frame
                    .data
                    .slice(s![rect.y..rect.bottom(), rect.x..rect.right()]),
            ),
            None => out.fill(1.0),
        }
    }
}
