use anyhow::{bail, Context, Result};
use clap::Args;
use chromafix_core::config::CorrectionParams;
use chromafix_core::geom::Rect;
use chromafix_core::resample::Interpolation;
use chromafix_core::shift::{AxisShift, ChannelShifts, ShiftMode, ShiftParams};

/// Shift parameters shared by every subcommand that renders.
#[derive(Args)]
pub struct ShiftArgs {
    /// Shift mode: lateral, directional or combined (inferred from the
    /// given amounts when omitted)
    #[arg(long)]
    pub mode: Option<ShiftMode>,

    /// Lateral red shift at the image border in pixels (positive = outward)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub red: f64,

    /// Lateral blue shift at the image border in pixels (positive = outward)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub blue: f64,

    /// Vertical lateral red shift, if different from --red
    #[arg(long, allow_hyphen_values = true)]
    pub red_y: Option<f64>,

    /// Vertical lateral blue shift, if different from --blue
    #[arg(long, allow_hyphen_values = true)]
    pub blue_y: Option<f64>,

    /// Directional red shift along x (positive = rightward)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub red_dx: f64,

    /// Directional red shift along y (positive = downward)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub red_dy: f64,

    /// Directional blue shift along x (positive = rightward)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub blue_dx: f64,

    /// Directional blue shift along y (positive = downward)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub blue_dy: f64,

    /// Center of the lateral model as X,Y (default: image center)
    #[arg(long, value_delimiter = ',', num_args = 1)]
    pub center: Option<Vec<f64>>,

    /// Interpolation: nearest, linear or cubic
    #[arg(short, long, default_value = "linear")]
    pub interpolation: Interpolation,

    /// Classic plug-in argument list:
    /// blue,red[,interpolation[,x_blue[,x_red[,y_blue[,y_red]]]]]
    /// (overrides every other shift option)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub legacy: Option<Vec<f64>>,
}

impl ShiftArgs {
    /// Validated parameters for a `width` x `height` image.
    pub fn to_params(&self, width: usize, height: usize) -> Result<CorrectionParams> {
        if let Some(ref values) = self.legacy {
            return CorrectionParams::from_legacy_args(values, width, height)
                .context("Invalid legacy argument list");
        }

        let center = match self.center.as_deref() {
            None => None,
            Some(&[x, y]) => Some([x, y]),
            Some(other) => bail!("--center expects X,Y, got {} value(s)", other.len()),
        };

        let lateral = ChannelShifts::new(
            AxisShift::new(self.red, self.red_y.unwrap_or(self.red)),
            AxisShift::new(self.blue, self.blue_y.unwrap_or(self.blue)),
        );
        let directional = ChannelShifts::new(
            AxisShift::new(self.red_dx, self.red_dy),
            AxisShift::new(self.blue_dx, self.blue_dy),
        );
        let mode = self.mode.unwrap_or(match (lateral.is_zero(), directional.is_zero()) {
            (false, false) => ShiftMode::Combined,
            (true, false) => ShiftMode::Directional,
            _ => ShiftMode::Lateral,
        });

        let params = CorrectionParams::new(
            ShiftParams {
                mode,
                lateral,
                directional,
                center,
            },
            self.interpolation,
        );
        params
            .validate(width, height)
            .context("Invalid shift parameters")?;
        Ok(params)
    }
}

/// Parse an `X,Y,W,H` list into a rectangle.
pub fn parse_region(values: &[usize]) -> Result<Rect> {
    match values {
        &[x, y, width, height] => Ok(Rect::new(x, y, width, height)),
        other => bail!("a region is X,Y,W,H, got {} value(s)", other.len()),
    }
}
