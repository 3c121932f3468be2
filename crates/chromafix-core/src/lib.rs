pub mod cache;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod frame;
pub mod geom;
pub mod io;
pub mod preview;
pub mod resample;
pub mod shift;

pub use config::{CorrectionConfig, CorrectionParams, EngineConfig, PreviewConfig};
pub use engine::{CorrectionEngine, ProgressReporter, Viewport};
pub use error::{ChromaError, Result};
pub use frame::{Channel, Raster, SourceRaster};
pub use geom::Rect;
pub use resample::Interpolation;
pub use shift::{AxisShift, ChannelShifts, ShiftMode, ShiftModel, ShiftParams};
