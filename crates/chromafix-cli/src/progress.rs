use chromafix_core::engine::{EngineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Drives an `indicatif` bar from engine progress callbacks.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::default_bar()
            .template("{msg:26} [{bar:40}] {pos}/{len} bands")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

impl Default for BarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: EngineStage, total_items: Option<usize>) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        // Parallel bands may report out of order.
        if items_done as u64 > self.bar.position() {
            self.bar.set_position(items_done as u64);
        }
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}
