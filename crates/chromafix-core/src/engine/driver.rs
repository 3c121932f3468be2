use ndarray::{s, Array2, ArrayViewMut2};

use crate::cache::SourceWindow;
use crate::frame::{Channel, Frame, Raster, SourceRaster};
use crate::geom::Rect;
use crate::resample::Interpolation;
use crate::shift::ShiftModel;

/// Regular grid of source pixels `(x0 + col * step, y0 + row * step)`.
///
/// Final passes use `step == 1`; decimated previews use larger steps.
/// Blocks of the lattice are addressed in lattice index space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Lattice {
    pub x0: usize,
    pub y0: usize,
    pub step: usize,
    pub cols: usize,
    pub rows: usize,
}

impl Lattice {
    /// Every pixel of `region`.
    pub fn dense(region: Rect) -> Self {
        Self {
            x0: region.x,
            y0: region.y,
            step: 1,
            cols: region.width,
            rows: region.height,
        }
    }

    /// All lattice indices.
    pub fn bounds(&self) -> Rect {
        Rect::full(self.cols, self.rows)
    }

    pub fn source_x(&self, col: usize) -> usize {
        self.x0 + col * self.step
    }

    pub fn source_y(&self, row: usize) -> usize {
        self.y0 + row * self.step
    }

    /// Smallest source rectangle holding every lattice point of `block`.
    pub fn footprint(&self, block: Rect) -> Rect {
        if block.is_empty() {
            return Rect::new(self.source_x(block.x), self.source_y(block.y), 0, 0);
        }
        let x = self.source_x(block.x);
        let y = self.source_y(block.y);
        Rect::new(
            x,
            y,
            self.source_x(block.right() - 1) - x + 1,
            self.source_y(block.bottom() - 1) - y + 1,
        )
    }
}

/// Resample red and blue for the lattice points of `block` into `red` and
/// `blue` (shape = block.height x block.width).
///
/// `margin` is derived by the caller from the current shift model. Dense
/// lattices ensure the window once per budget-sized chunk of the block.
/// When the kernel neighborhoods of neighboring lattice points cannot
/// touch, each point is ensured on its own so the pixels between them are
/// never loaded.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_block<S: SourceRaster + ?Sized>(
    window: &mut SourceWindow<'_, S>,
    model: &ShiftModel,
    interpolation: Interpolation,
    margin: usize,
    lattice: &Lattice,
    block: Rect,
    mut red: ArrayViewMut2<f32>,
    mut blue: ArrayViewMut2<f32>,
) {
    if lattice.step > 2 * margin + 1 {
        for row in 0..block.height {
            let y = lattice.source_y(block.y + row);
            for col in 0..block.width {
                let x = lattice.source_x(block.x + col);
                window.ensure(Rect::new(x, y, 1, 1), margin);
                let (r, b) = sample_point(window, model, interpolation, x, y);
                red[[row, col]] = r;
                blue[[row, col]] = b;
            }
        }
        return;
    }

    for chunk in budget_chunks(lattice, block, margin, window.budget()) {
        window.ensure(lattice.footprint(chunk), margin);
        for row in chunk.y..chunk.bottom() {
            let y = lattice.source_y(row);
            for col in chunk.x..chunk.right() {
                let x = lattice.source_x(col);
                let (r, b) = sample_point(window, model, interpolation, x, y);
                red[[row - block.y, col - block.x]] = r;
                blue[[row - block.y, col - block.x]] = b;
            }
        }
    }
}

fn sample_point<S: SourceRaster + ?Sized>(
    window: &SourceWindow<'_, S>,
    model: &ShiftModel,
    interpolation: Interpolation,
    x: usize,
    y: usize,
) -> (f32, f32) {
    let (x, y) = (x as f64, y as f64);
    let (rx, ry) = model.source_coordinate(x, y, Channel::Red);
    let (bx, by) = model.source_coordinate(x, y, Channel::Blue);
    (
        interpolation.sample(window, rx, ry, Channel::Red),
        interpolation.sample(window, bx, by, Channel::Blue),
    )
}

/// Split `block` into pieces whose footprint grown by `margin` fits in
/// `budget` pixels: whole lattice rows when one row fits, otherwise runs of
/// a single row. A lone point may still exceed a tiny budget.
fn budget_chunks(lattice: &Lattice, block: Rect, margin: usize, budget: usize) -> Vec<Rect> {
    if block.is_empty() {
        return Vec::new();
    }
    let pad = 2 * margin + 1;
    // Source pixels spanned by `n` lattice points plus the margin, and the
    // number of points that fit in `limit` pixels.
    let span = |n: usize| (n - 1) * lattice.step + pad;
    let fit = |limit: usize| 1 + limit.saturating_sub(pad) / lattice.step;

    let row_width = span(block.width);
    let (cols, rows) = if row_width * pad <= budget {
        (block.width, fit(budget / row_width))
    } else {
        (fit(budget / pad), 1)
    };
    block.grid(cols, rows)
}

/// Unshifted copy of `channel` at the lattice points of `block`.
pub(crate) fn gather_channel<S: SourceRaster + ?Sized>(
    source: &S,
    channel: Channel,
    lattice: &Lattice,
    block: Rect,
) -> Array2<f32> {
    let mut out = Array2::<f32>::zeros((block.height, block.width));
    if lattice.step == 1 {
        source.copy_rect(channel, lattice.footprint(block), out.view_mut());
    } else {
        for row in 0..block.height {
            let y = lattice.source_y(block.y + row);
            for col in 0..block.width {
                out[[row, col]] = source.value(lattice.source_x(block.x + col), y, channel);
            }
        }
    }
    out
}

/// A raster for the lattice points of `block` holding the unshifted source
/// values of every channel. Red and blue are overwritten by the caller.
pub(crate) fn passthrough_raster<S: SourceRaster + ?Sized>(
    source: &S,
    lattice: &Lattice,
    block: Rect,
) -> Raster {
    let depth = source.bit_depth();
    let plane = |channel| Frame::new(gather_channel(source, channel, lattice, block), depth);
    Raster {
        red: plane(Channel::Red),
        green: plane(Channel::Green),
        blue: plane(Channel::Blue),
        alpha: source.has_alpha().then(|| plane(Channel::Alpha)),
    }
}

/// Render a lattice-index `block` into a standalone raster: red and blue
/// resampled, green and alpha passed through.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_raster_block<S: SourceRaster + ?Sized>(
    source: &S,
    window: &mut SourceWindow<'_, S>,
    model: &ShiftModel,
    interpolation: Interpolation,
    margin: usize,
    lattice: &Lattice,
    block: Rect,
) -> Raster {
    let depth = source.bit_depth();
    let mut red = Array2::<f32>::zeros((block.height, block.width));
    let mut blue = Array2::<f32>::zeros((block.height, block.width));
    render_block(
        window,
        model,
        interpolation,
        margin,
        lattice,
        block,
        red.view_mut(),
        blue.view_mut(),
    );

    let plane = |channel| Frame::new(gather_channel(source, channel, lattice, block), depth);
    Raster {
        red: Frame::new(red, depth),
        green: plane(Channel::Green),
        blue: Frame::new(blue, depth),
        alpha: source.has_alpha().then(|| plane(Channel::Alpha)),
    }
}

/// Copy the part of `tile` (placed at `tile_rect`) that overlaps `view`
/// into `out`, whose origin is `view`'s top-left. Both rectangles are in
/// lattice index space.
pub(crate) fn blit(tile: &Raster, tile_rect: Rect, out: &mut Raster, view: Rect) {
    let Some(overlap) = tile_rect.intersect(&view) else {
        return;
    };
    let (sy, sx) = (overlap.y - tile_rect.y, overlap.x - tile_rect.x);
    let (dy, dx) = (overlap.y - view.y, overlap.x - view.x);
    let (h, w) = (overlap.height, overlap.width);
    for channel in [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha] {
        if let (Some(from), Some(to)) = (tile.channel(channel), out.channel_mut(channel)) {
            to.data
                .slice_mut(s![dy..dy + h, dx..dx + w])
                .assign(&from.data.slice(s![sy..sy + h, sx..sx + w]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_chunks_fit_budget_and_cover_block() {
        let lattice = Lattice::dense(Rect::full(500, 500));
        let block = Rect::new(10, 20, 128, 128);
        let margin = 4;
        let chunks = budget_chunks(&lattice, block, margin, 5_000);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.iter().map(Rect::area).sum::<usize>(), block.area());
        for chunk in &chunks {
            assert!(block.contains_rect(chunk));
            let fp = lattice.footprint(*chunk);
            let grown = (fp.width + 2 * margin) * (fp.height + 2 * margin);
            assert!(grown <= 5_000, "{chunk} needs {grown} px");
        }
    }

    #[test]
    fn test_budget_chunks_keep_whole_block_when_it_fits() {
        let lattice = Lattice {
            x0: 0,
            y0: 0,
            step: 3,
            cols: 50,
            rows: 50,
        };
        let block = Rect::new(0, 0, 16, 16);
        assert_eq!(budget_chunks(&lattice, block, 2, 1 << 20), vec![block]);
    }

    #[test]
    fn test_footprint_of_decimated_block() {
        let lattice = Lattice {
            x0: 1,
            y0: 2,
            step: 3,
            cols: 10,
            rows: 10,
        };
        // Lattice columns 2..4 -> source x 7, 10; rows 0..1 -> source y 2.
        let fp = lattice.footprint(Rect::new(2, 0, 2, 1));
        assert_eq!(fp, Rect::new(7, 2, 4, 1));
    }
}
