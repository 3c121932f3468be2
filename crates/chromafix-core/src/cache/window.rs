use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::SHIFTED_CHANNEL_COUNT;
use crate::frame::{Channel, SourceRaster};
use crate::geom::Rect;
use crate::resample::PixelAccess;

/// How a window repositions when a requirement falls outside its extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPolicy {
    /// Row-cache style. Grows to cover old and new requirement and, when
    /// over budget, drops the rows (then columns) farthest from the new
    /// requirement. Suited to top-to-bottom sweeps.
    #[default]
    Sliding,
    /// Tile-cache style. Grows when the union fits the budget and is no
    /// larger than the old extent and the new requirement together (they
    /// overlap or abut); otherwise swaps in exactly the new requirement.
    /// Suited to arbitrary viewport jumps and sparse sampling.
    Replace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// `ensure` calls already covered by the materialized extent.
    pub hits: u64,
    /// `ensure` calls that required a refill.
    pub misses: u64,
    /// Pixels (per cached channel) copied from the source.
    pub pixels_loaded: u64,
}

/// A bounded, lazily-populated copy of the red and blue planes of a source
/// raster.
///
/// Callers declare the output region they are about to produce and the
/// margin its kernels need via [`SourceWindow::ensure`]; reads are only
/// legal inside the last ensured requirement.
pub struct SourceWindow<'a, S: SourceRaster + ?Sized> {
    source: &'a S,
    width: usize,
    height: usize,
    policy: WindowPolicy,
    budget: usize,
    /// Materialized rectangle (superset of `required`).
    extent: Rect,
    /// Last ensured requirement, already clamped to the raster.
    required: Rect,
    /// Red and blue planes, shape = (extent.height, extent.width).
    planes: [Array2<f32>; SHIFTED_CHANNEL_COUNT],
    stats: WindowStats,
}

impl<'a, S: SourceRaster + ?Sized> SourceWindow<'a, S> {
    /// An empty window. Nothing is loaded until the first `ensure`.
    pub fn new(source: &'a S, policy: WindowPolicy, budget_pixels: usize) -> Self {
        let (width, height) = source.dimensions();
        Self {
            source,
            width,
            height,
            policy,
            budget: budget_pixels.max(1),
            extent: Rect::default(),
            required: Rect::default(),
            planes: [Array2::zeros((0, 0)), Array2::zeros((0, 0))],
            stats: WindowStats::default(),
        }
    }

    pub fn extent(&self) -> Rect {
        self.extent
    }

    pub fn required(&self) -> Rect {
        self.required
    }

    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    /// Pixels per cached channel the window tries to stay under.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Guarantee that `region` grown by `margin` on every side (clamped to
    /// the raster) is materialized. Loads only pixels not already held.
    pub fn ensure(&mut self, region: Rect, margin: usize) {
        let needed = region.expand_clamped(margin, self.width, self.height);
        self.required = needed;

        if self.extent.contains_rect(&needed) {
            self.stats.hits += 1;
            return;
        }
        self.stats.misses += 1;

        if needed.area() > self.budget {
            warn!(
                needed = needed.area(),
                budget = self.budget,
                "Source window requirement exceeds budget; honoring it in full"
            );
        }

        let next = self.next_extent(needed);
        debug!(from = %self.extent, to = %next, margin, "Refilling source window");
        self.materialize(next);
    }

    /// Cached value of `channel` (red or blue) at (x, y).
    ///
    /// # Panics
    ///
    /// When (x, y) lies outside the last ensured requirement, or when asked
    /// for an unshifted channel. Either is a bug in the caller.
    pub fn read(&self, x: usize, y: usize, channel: Channel) -> f32 {
        assert!(
            self.required.contains_point(x, y),
            "source window read at ({x}, {y}) outside ensured region {}",
            self.required
        );
        let plane = &self.planes[plane_index(channel)];
        plane[[y - self.extent.y, x - self.extent.x]]
    }

    fn next_extent(&self, needed: Rect) -> Rect {
        let candidate = self.extent.union(&needed);
        let grows = match self.policy {
            WindowPolicy::Sliding => true,
            // Never load the gap between two distant requirements.
            WindowPolicy::Replace => candidate.area() <= self.extent.area() + needed.area(),
        };
        if grows && candidate.area() <= self.budget {
            return candidate;
        }
        match self.policy {
            WindowPolicy::Replace => needed,
            WindowPolicy::Sliding => slide(candidate, needed, self.budget),
        }
    }

    fn materialize(&mut self, next: Rect) {
        let mut planes = [
            Array2::<f32>::zeros((next.height, next.width)),
            Array2::<f32>::zeros((next.height, next.width)),
        ];

        let overlap = self.extent.intersect(&next);
        if let Some(ov) = overlap {
            let old = self.extent;
            for (fresh, kept) in planes.iter_mut().zip(self.planes.iter()) {
                fresh
                    .slice_mut(s![
                        ov.y - next.y..ov.bottom() - next.y,
                        ov.x - next.x..ov.right() - next.x
                    ])
                    .assign(&kept.slice(s![
                        ov.y - old.y..ov.bottom() - old.y,
                        ov.x - old.x..ov.right() - old.x
                    ]));
            }
        }

        let missing = match overlap {
            Some(ov) => next.subtract(&ov),
            None => vec![next],
        };
        for part in missing {
            for (plane, channel) in planes.iter_mut().zip(Channel::SHIFTED) {
                let view = plane.slice_mut(s![
                    part.y - next.y..part.bottom() - next.y,
                    part.x - next.x..part.right() - next.x
                ]);
                self.source.copy_rect(channel, part, view);
            }
            self.stats.pixels_loaded += part.area() as u64;
        }

        self.planes = planes;
        self.extent = next;
    }
}

impl<S: SourceRaster + ?Sized> PixelAccess for SourceWindow<'_, S> {
    fn raster_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn read(&self, x: usize, y: usize, channel: Channel) -> f32 {
        SourceWindow::read(self, x, y, channel)
    }
}

fn plane_index(channel: Channel) -> usize {
    match channel {
        Channel::Red => 0,
        Channel::Blue => 1,
        other => panic!("source window holds only shifted channels, not {other}"),
    }
}

/// Trim `candidate` to fit `budget`, keeping `needed` and dropping rows,
/// then columns, farthest from it first.
fn slide(candidate: Rect, needed: Rect, budget: usize) -> Rect {
    let (y, height) = trim_span(
        candidate.y,
        candidate.height,
        needed.y,
        needed.height,
        budget / candidate.width.max(1),
    );
    let rows = Rect::new(candidate.x, y, candidate.width, height);
    if rows.area() <= budget {
        return rows;
    }
    let (x, width) = trim_span(
        rows.x,
        rows.width,
        needed.x,
        needed.width,
        budget / rows.height.max(1),
    );
    Rect::new(x, rows.y, width, rows.height)
}

/// Shrink the span `start..start + len` to at most `limit` entries while
/// keeping `keep_start..keep_start + keep_len`, trimming both ends evenly.
fn trim_span(
    start: usize,
    len: usize,
    keep_start: usize,
    keep_len: usize,
    limit: usize,
) -> (usize, usize) {
    let limit = limit.max(keep_len);
    if len <= limit {
        return (start, len);
    }
    let spare = limit - keep_len;
    let before = keep_start - start;
    let after = (start + len) - (keep_start + keep_len);

    let take_before = before.min(spare / 2);
    let take_after = after.min(spare - take_before);
    let take_before = before.min(spare - take_after);

    (keep_start - take_before, keep_len + take_before + take_after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_span_keeps_requirement() {
        // Span 0..100, keep 60..80, at most 30 entries.
        let (start, len) = trim_span(0, 100, 60, 20, 30);
        assert_eq!(len, 30);
        assert!(start <= 60 && start + len >= 80);
    }

    #[test]
    fn test_trim_span_gives_spare_to_the_available_side() {
        // Nothing after the requirement: all spare goes before it.
        let (start, len) = trim_span(0, 100, 80, 20, 30);
        assert_eq!((start, len), (70, 30));
    }

    #[test]
    fn test_slide_never_drops_below_requirement() {
        let candidate = Rect::new(0, 0, 50, 50);
        let needed = Rect::new(10, 30, 40, 20);
        let r = slide(candidate, needed, 10);
        assert!(r.contains_rect(&needed));
    }
}
