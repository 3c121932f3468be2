use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel coordinates. `x`/`y` is the top-left
/// corner; the rectangle covers columns `x..x + width` and rows
/// `y..y + height`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` image.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains_point(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// True when `other` lies entirely inside `self`. An empty `other` is
    /// contained in anything.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Grow by `margin` on every side, clamped to a `width` x `height` image.
    pub fn expand_clamped(&self, margin: usize, width: usize, height: usize) -> Rect {
        let x0 = self.x.saturating_sub(margin).min(width);
        let y0 = self.y.saturating_sub(margin).min(height);
        let x1 = self.right().saturating_add(margin).min(width);
        let y1 = self.bottom().saturating_add(margin).min(height);
        Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Clip to a `width` x `height` image.
    pub fn clamp_to(&self, width: usize, height: usize) -> Rect {
        self.expand_clamped(0, width, height)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Split `self` minus `hole` into at most four disjoint bands
    /// (top, bottom, left, right).
    pub fn subtract(&self, hole: &Rect) -> Vec<Rect> {
        let Some(hole) = self.intersect(hole) else {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        };

        let mut parts = Vec::with_capacity(4);
        if hole.y > self.y {
            parts.push(Rect::new(self.x, self.y, self.width, hole.y - self.y));
        }
        if hole.bottom() < self.bottom() {
            parts.push(Rect::new(
                self.x,
                hole.bottom(),
                self.width,
                self.bottom() - hole.bottom(),
            ));
        }
        if hole.x > self.x {
            parts.push(Rect::new(self.x, hole.y, hole.x - self.x, hole.height));
        }
        if hole.right() < self.right() {
            parts.push(Rect::new(
                hole.right(),
                hole.y,
                self.right() - hole.right(),
                hole.height,
            ));
        }
        parts
    }

    /// Row-major tiling into `tile` x `tile` pieces.
    pub fn tiles(&self, tile: usize) -> Vec<Rect> {
        self.grid(tile, tile)
    }

    /// Row-major split into `cols` x `rows` pieces (edge pieces are smaller).
    pub fn grid(&self, cols: usize, rows: usize) -> Vec<Rect> {
        let (cols, rows) = (cols.max(1), rows.max(1));
        let mut out = Vec::new();
        let mut y = self.y;
        while y < self.bottom() {
            let h = rows.min(self.bottom() - y);
            let mut x = self.x;
            while x < self.right() {
                let w = cols.min(self.right() - x);
                out.push(Rect::new(x, y, w, h));
                x += w;
            }
            y += h;
        }
        out
    }

    /// Horizontal bands of at most `rows` rows spanning the full width.
    pub fn bands(&self, rows: usize) -> Vec<Rect> {
        let rows = rows.max(1);
        let mut out = Vec::new();
        let mut y = self.y;
        while y < self.bottom() {
            let h = rows.min(self.bottom() - y);
            out.push(Rect::new(self.x, y, self.width, h));
            y += h;
        }
        out
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
