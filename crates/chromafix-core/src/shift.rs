//! Geometric model of the aberration: maps an output pixel of a shifted
//! channel to the source coordinate it has to be sampled from.

use serde::{Deserialize, Serialize};

use crate::frame::Channel;

/// A signed amount along each image axis, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisShift {
    pub x: f64,
    pub y: f64,
}

impl AxisShift {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The same amount on both axes.
    pub fn uniform(v: f64) -> Self {
        Self { x: v, y: v }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Per-channel shift amounts. Green is the reference and never shifted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelShifts {
    pub red: AxisShift,
    pub blue: AxisShift,
}

impl ChannelShifts {
    pub fn new(red: AxisShift, blue: AxisShift) -> Self {
        Self { red, blue }
    }

    pub fn get(&self, channel: Channel) -> Option<AxisShift> {
        match channel {
            Channel::Red => Some(self.red),
            Channel::Blue => Some(self.blue),
            Channel::Green | Channel::Alpha => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.red.is_zero() && self.blue.is_zero()
    }

    /// All four amounts as (label, value), for validation and reporting.
    pub fn labeled(&self) -> [(&'static str, f64); 4] {
        [
            ("red.x", self.red.x),
            ("red.y", self.red.y),
            ("blue.x", self.blue.x),
            ("blue.y", self.blue.y),
        ]
    }
}

/// Which aberration model is corrected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftMode {
    /// Zero at the center, growing radially toward the border.
    #[default]
    Lateral,
    /// A constant offset over the whole frame.
    Directional,
    /// Lateral scaling followed by the directional offset.
    Combined,
}

impl ShiftMode {
    pub fn uses_lateral(self) -> bool {
        matches!(self, ShiftMode::Lateral | ShiftMode::Combined)
    }

    pub fn uses_directional(self) -> bool {
        matches!(self, ShiftMode::Directional | ShiftMode::Combined)
    }
}

impl std::fmt::Display for ShiftMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftMode::Lateral => write!(f, "Lateral"),
            ShiftMode::Directional => write!(f, "Directional"),
            ShiftMode::Combined => write!(f, "Combined"),
        }
    }
}

impl std::str::FromStr for ShiftMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lateral" => Ok(ShiftMode::Lateral),
            "directional" => Ok(ShiftMode::Directional),
            "combined" => Ok(ShiftMode::Combined),
            other => Err(format!(
                "unknown shift mode '{other}' (expected lateral, directional or combined)"
            )),
        }
    }
}

/// Shift amounts for one correction pass.
///
/// Lateral amounts are the displacement realized at the image border of
/// the corresponding axis; positive moves the channel outward. Directional
/// amounts are constant offsets; positive moves the channel toward +x / +y.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftParams {
    pub mode: ShiftMode,
    pub lateral: ChannelShifts,
    pub directional: ChannelShifts,
    /// Center of the lateral model as [x, y]. `None` = image center.
    pub center: Option<[f64; 2]>,
}

impl ShiftParams {
    pub fn lateral(red: AxisShift, blue: AxisShift) -> Self {
        Self {
            mode: ShiftMode::Lateral,
            lateral: ChannelShifts::new(red, blue),
            ..Default::default()
        }
    }

    pub fn directional(red: AxisShift, blue: AxisShift) -> Self {
        Self {
            mode: ShiftMode::Directional,
            directional: ChannelShifts::new(red, blue),
            ..Default::default()
        }
    }

    /// True when the active mode moves nothing.
    pub fn is_identity(&self) -> bool {
        let lateral_zero = !self.mode.uses_lateral() || self.lateral.is_zero();
        let directional_zero = !self.mode.uses_directional() || self.directional.is_zero();
        lateral_zero && directional_zero
    }
}

/// One axis of the mapping for one channel:
/// `src = center + (out - center) / scale - offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AxisMap {
    center: f64,
    scale: f64,
    offset: f64,
    /// Extreme values of `out - center` over the output pixels.
    r_min: f64,
    r_max: f64,
}

impl AxisMap {
    fn new(size: usize, center: Option<f64>, lateral: f64, offset: f64) -> Self {
        if size == 0 {
            return Self {
                center: 0.0,
                scale: 1.0,
                offset,
                r_min: 0.0,
                r_max: 0.0,
            };
        }

        let last = (size - 1) as f64;
        let center = center.unwrap_or(last / 2.0);
        let max_dist = center.max(last - center);

        // Degenerate axis (single pixel): no radial scaling.
        let mut scale = if max_dist > 0.0 {
            1.0 + lateral / max_dist
        } else {
            1.0
        };
        // Collapsing scales are rejected by parameter validation.
        if !(scale > 0.0 && scale.is_finite()) {
            scale = 1.0;
        }

        Self {
            center,
            scale,
            offset,
            r_min: -center,
            r_max: last - center,
        }
    }

    fn source(&self, out: f64) -> f64 {
        self.center + (out - self.center) / self.scale - self.offset
    }

    fn forward(&self, src: f64) -> f64 {
        self.center + (src + self.offset - self.center) * self.scale
    }

    fn displacement_at(&self, r: f64) -> f64 {
        (r / self.scale - r - self.offset).abs()
    }

    /// `src - out` is affine in `out`, so its magnitude peaks at an end.
    fn max_displacement(&self) -> f64 {
        self.displacement_at(self.r_min)
            .max(self.displacement_at(self.r_max))
    }

    fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }
}

/// Per-pass shift model for an image of fixed size.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftModel {
    width: usize,
    height: usize,
    /// [x, y] maps for red.
    red: [AxisMap; 2],
    /// [x, y] maps for blue.
    blue: [AxisMap; 2],
}

impl ShiftModel {
    pub fn new(params: &ShiftParams, width: usize, height: usize) -> Self {
        let center = params.center;
        let axes = |channel: Channel| {
            let lateral = if params.mode.uses_lateral() {
                params.lateral.get(channel).unwrap_or_default()
            } else {
                AxisShift::default()
            };
            let directional = if params.mode.uses_directional() {
                params.directional.get(channel).unwrap_or_default()
            } else {
                AxisShift::default()
            };
            [
                AxisMap::new(width, center.map(|c| c[0]), lateral.x, directional.x),
                AxisMap::new(height, center.map(|c| c[1]), lateral.y, directional.y),
            ]
        };

        Self {
            width,
            height,
            red: axes(Channel::Red),
            blue: axes(Channel::Blue),
        }
    }

    /// A model that maps every pixel onto itself.
    pub fn identity(width: usize, height: usize) -> Self {
        Self::new(&ShiftParams::default(), width, height)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn maps(&self, channel: Channel) -> Option<&[AxisMap; 2]> {
        match channel {
            Channel::Red => Some(&self.red),
            Channel::Blue => Some(&self.blue),
            Channel::Green | Channel::Alpha => None,
        }
    }

    /// Source coordinate to sample for output pixel (x, y) of `channel`.
    /// Unshifted channels map onto themselves.
    pub fn source_coordinate(&self, x: f64, y: f64, channel: Channel) -> (f64, f64) {
        match self.maps(channel) {
            Some([mx, my]) => (mx.source(x), my.source(y)),
            None => (x, y),
        }
    }

    /// Where source point (x, y) of `channel` ends up in the output. Inverse
    /// of [`ShiftModel::source_coordinate`].
    pub fn forward_coordinate(&self, x: f64, y: f64, channel: Channel) -> (f64, f64) {
        match self.maps(channel) {
            Some([mx, my]) => (mx.forward(x), my.forward(y)),
            None => (x, y),
        }
    }

    /// Largest |source - output| distance along either axis over all output
    /// pixels and shifted channels.
    pub fn max_displacement(&self) -> f64 {
        self.red
            .iter()
            .chain(self.blue.iter())
            .map(AxisMap::max_displacement)
            .fold(0.0, f64::max)
    }

    pub fn is_identity(&self) -> bool {
        self.red.iter().chain(self.blue.iter()).all(AxisMap::is_identity)
    }
}
