use serde::{Deserialize, Serialize};

use crate::geom::Rect;

/// Engine stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStage {
    Correcting,
    Previewing,
}

impl std::fmt::Display for EngineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Correcting => write!(f, "Shifting pixel components"),
            Self::Previewing => write!(f, "Rendering preview"),
        }
    }
}

/// Thread-safe progress reporting for correction passes.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A stage has started. `total_items` is the number of bands, if known.
    fn begin_stage(&self, _stage: EngineStage, _total_items: Option<usize>) {}

    /// `items_done` bands of the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// The part of the source a preview shows.
///
/// Preview pixel (i, j) is the corrected source pixel
/// `(region.x + i * step, region.y + j * step)`; `step > 1` zooms out by
/// decimation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub region: Rect,
    pub step: usize,
}

impl Viewport {
    pub fn new(region: Rect) -> Self {
        Self { region, step: 1 }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    /// (width, height) of the rendered preview.
    pub fn output_size(&self) -> (usize, usize) {
        let step = self.step.max(1);
        (
            self.region.width.div_ceil(step),
            self.region.height.div_ceil(step),
        )
    }
}
