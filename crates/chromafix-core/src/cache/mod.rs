pub mod tiles;
pub mod window;

pub use tiles::{TileCache, TileCacheStats, TileKey};
pub use window::{SourceWindow, WindowPolicy, WindowStats};

use crate::consts::MARGIN_SLACK;
use crate::resample::Interpolation;
use crate::shift::ShiftModel;

/// Source margin (in pixels) that a window must hold around an output
/// region so that every read the kernel makes for that region is inside
/// the window.
///
/// Derived from the current model every time it is needed: the largest
/// source displacement rounded up, plus the kernel's half-support.
pub fn margin_for(model: &ShiftModel, interpolation: Interpolation) -> usize {
    let displacement = model.max_displacement();
    let shift_margin = if displacement > 0.0 {
        (displacement + MARGIN_SLACK).ceil() as usize
    } else {
        0
    };
    shift_margin + interpolation.half_support()
}
