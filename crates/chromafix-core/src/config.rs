use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::WindowPolicy;
use crate::consts::{
    DEFAULT_TILE_CACHE_CAPACITY, DEFAULT_TILE_SIZE, DEFAULT_WINDOW_BUDGET_PIXELS,
    MAX_PREVIEW_SATURATION, MIN_PREVIEW_SATURATION,
};
use crate::error::{ChromaError, Result};
use crate::resample::Interpolation;
use crate::shift::{AxisShift, ChannelShifts, ShiftMode, ShiftParams};

/// Everything that determines the pixels of a correction pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionParams {
    #[serde(default)]
    pub shift: ShiftParams,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl CorrectionParams {
    pub fn new(shift: ShiftParams, interpolation: Interpolation) -> Self {
        Self {
            shift,
            interpolation,
        }
    }

    /// Reject parameters the engine cannot honor for a `width` x `height`
    /// image: non-finite amounts, a center outside the image, or a lateral
    /// amount so negative that it would fold the image onto its center.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        let shift = &self.shift;
        for (group, shifts) in [("lateral", &shift.lateral), ("directional", &shift.directional)] {
            for (label, value) in shifts.labeled() {
                if !value.is_finite() {
                    return Err(ChromaError::InvalidParameter(format!(
                        "{group}.{label} must be finite, got {value}"
                    )));
                }
            }
        }

        let centers = match shift.center {
            Some([cx, cy]) => {
                if !cx.is_finite() || !cy.is_finite() {
                    return Err(ChromaError::InvalidParameter(format!(
                        "center must be finite, got ({cx}, {cy})"
                    )));
                }
                let max_x = width.saturating_sub(1) as f64;
                let max_y = height.saturating_sub(1) as f64;
                if cx < 0.0 || cy < 0.0 || cx > max_x || cy > max_y {
                    return Err(ChromaError::InvalidParameter(format!(
                        "center ({cx}, {cy}) lies outside the {width}x{height} image"
                    )));
                }
                [Some(cx), Some(cy)]
            }
            None => [None, None],
        };

        if shift.mode.uses_lateral() {
            let lat = &shift.lateral;
            let checks = [
                ("red.x", lat.red.x, width, centers[0]),
                ("red.y", lat.red.y, height, centers[1]),
                ("blue.x", lat.blue.x, width, centers[0]),
                ("blue.y", lat.blue.y, height, centers[1]),
            ];
            for (label, value, size, center) in checks {
                let max_dist = border_distance(size, center);
                if max_dist > 0.0 && max_dist + value <= 0.0 {
                    return Err(ChromaError::InvalidParameter(format!(
                        "lateral.{label} = {value} collapses the image (border distance is {max_dist})"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Stable hash of everything that affects rendered pixels. Used to key
    /// memoized preview tiles.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.shift.mode.hash(&mut hasher);
        for shifts in [&self.shift.lateral, &self.shift.directional] {
            for (_, value) in shifts.labeled() {
                value.to_bits().hash(&mut hasher);
            }
        }
        self.shift
            .center
            .map(|[x, y]| (x.to_bits(), y.to_bits()))
            .hash(&mut hasher);
        self.interpolation.hash(&mut hasher);
        hasher.finish()
    }

    /// Build parameters from the positional argument list of the classic
    /// non-interactive plug-in call:
    /// `blue, red [, interpolation [, x_blue [, x_red [, y_blue [, y_red]]]]]`.
    ///
    /// The lateral amounts are realized at the border of the larger image
    /// dimension with one uniform radial scale, so the shorter axis gets a
    /// proportionally smaller amount. Missing values default to zero and a
    /// missing interpolation code to none (nearest).
    pub fn from_legacy_args(args: &[f64], width: usize, height: usize) -> Result<Self> {
        if args.len() < 2 || args.len() > 7 {
            return Err(ChromaError::InvalidParameter(format!(
                "expected 2 to 7 legacy values, got {}",
                args.len()
            )));
        }
        let at = |i: usize| args.get(i).copied().unwrap_or(0.0);

        let interpolation = match args.get(2) {
            None => Interpolation::Nearest,
            Some(&code) => {
                if code.fract() != 0.0 || !(0.0..=2.0).contains(&code) {
                    return Err(ChromaError::InvalidParameter(format!(
                        "interpolation code must be 0, 1 or 2, got {code}"
                    )));
                }
                Interpolation::try_from(code as u8).map_err(ChromaError::InvalidParameter)?
            }
        };

        let (blue, red) = (at(0), at(1));
        let half_w = width.saturating_sub(1) as f64 / 2.0;
        let half_h = height.saturating_sub(1) as f64 / 2.0;
        let longest = half_w.max(half_h);
        let along = |amount: f64, half: f64| {
            if longest > 0.0 {
                amount * half / longest
            } else {
                0.0
            }
        };
        let lateral = ChannelShifts::new(
            AxisShift::new(along(red, half_w), along(red, half_h)),
            AxisShift::new(along(blue, half_w), along(blue, half_h)),
        );
        let directional = ChannelShifts::new(
            AxisShift::new(at(4), at(6)),
            AxisShift::new(at(3), at(5)),
        );

        let mode = match (lateral.is_zero(), directional.is_zero()) {
            (false, false) => ShiftMode::Combined,
            (true, false) => ShiftMode::Directional,
            _ => ShiftMode::Lateral,
        };

        let params = Self {
            shift: ShiftParams {
                mode,
                lateral,
                directional,
                center: None,
            },
            interpolation,
        };
        params.validate(width, height)?;
        Ok(params)
    }
}

/// Distance from `center` (default: middle) to the farther end of an axis.
fn border_distance(size: usize, center: Option<f64>) -> f64 {
    if size == 0 {
        return 0.0;
    }
    let last = (size - 1) as f64;
    let c = center.unwrap_or(last / 2.0);
    c.max(last - c)
}

/// Tuning of the engine. None of these affect output pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Edge length of a processing tile, in output pixels.
    pub tile_size: usize,
    /// Maximum pixels a source window keeps materialized per channel.
    pub window_budget_pixels: usize,
    /// Preview tiles retained between requests (0 disables).
    pub tile_cache_capacity: usize,
    /// Process bands of the final pass in parallel.
    pub parallel: bool,
    /// Window policy used during final passes.
    pub final_policy: WindowPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            window_budget_pixels: DEFAULT_WINDOW_BUDGET_PIXELS,
            tile_cache_capacity: DEFAULT_TILE_CACHE_CAPACITY,
            parallel: true,
            final_policy: WindowPolicy::Sliding,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(ChromaError::InvalidParameter(
                "tile_size must be > 0".into(),
            ));
        }
        if self.window_budget_pixels == 0 {
            return Err(ChromaError::InvalidParameter(
                "window_budget_pixels must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Display-only settings for previews.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Saturation change in percent (-100..=100). Never affects final output.
    pub saturation: f32,
}

impl PreviewConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.saturation.is_finite()
            || !(MIN_PREVIEW_SATURATION..=MAX_PREVIEW_SATURATION).contains(&self.saturation)
        {
            return Err(ChromaError::InvalidParameter(format!(
                "preview saturation must be within {MIN_PREVIEW_SATURATION}..={MAX_PREVIEW_SATURATION}, got {}",
                self.saturation
            )));
        }
        Ok(())
    }
}

/// A complete job description, as read from a TOML file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrectionConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub params: CorrectionParams,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}
