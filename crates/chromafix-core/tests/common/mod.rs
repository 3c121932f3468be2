#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array2, ArrayViewMut2};

use chromafix_core::frame::{Channel, Frame, Raster, SourceRaster};
use chromafix_core::geom::Rect;

/// Deterministic pseudo-random texture in [0, 1], different per channel.
pub fn textured_raster(width: usize, height: usize, with_alpha: bool) -> Raster {
    let plane = |seed: usize| {
        Frame::new(
            Array2::from_shape_fn((height, width), |(y, x)| {
                let v = (x * 7919 + y * 104_729 + seed * 15_485_863) % 1009;
                v as f32 / 1008.0
            }),
            16,
        )
    };
    Raster {
        red: plane(1),
        green: plane(2),
        blue: plane(3),
        alpha: with_alpha.then(|| plane(4)),
    }
}

/// Black raster with a single bright pixel in every channel at (x, y).
pub fn point_raster(width: usize, height: usize, x: usize, y: usize) -> Raster {
    let mut raster = Raster::filled(width, height, [0.0; 3], None);
    raster.red.data[[y, x]] = 1.0;
    raster.green.data[[y, x]] = 1.0;
    raster.blue.data[[y, x]] = 1.0;
    raster
}

/// Position (x, y) of the brightest pixel of a plane.
pub fn peak(frame: &Frame) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_val = f32::MIN;
    for ((y, x), &v) in frame.data.indexed_iter() {
        if v > best_val {
            best_val = v;
            best = (x, y);
        }
    }
    best
}

pub fn assert_rasters_equal(a: &Raster, b: &Raster) {
    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    for channel in [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha] {
        let (pa, pb) = (a.channel(channel), b.channel(channel));
        assert_eq!(pa.is_some(), pb.is_some(), "{channel} presence differs");
        if let (Some(pa), Some(pb)) = (pa, pb) {
            for ((pos, va), vb) in pa.data.indexed_iter().zip(pb.data.iter()) {
                assert_eq!(va, vb, "{channel} differs at {pos:?}");
            }
        }
    }
}

/// A source that counts how many pixels were pulled from it.
pub struct CountingSource {
    pub inner: Raster,
    pub pixels_read: AtomicU64,
}

impl CountingSource {
    pub fn new(inner: Raster) -> Self {
        Self {
            inner,
            pixels_read: AtomicU64::new(0),
        }
    }

    pub fn reads(&self) -> u64 {
        self.pixels_read.load(Ordering::Relaxed)
    }
}

impl SourceRaster for CountingSource {
    fn dimensions(&self) -> (usize, usize) {
        self.inner.dimensions()
    }

    fn has_alpha(&self) -> bool {
        self.inner.has_alpha()
    }

    fn value(&self, x: usize, y: usize, channel: Channel) -> f32 {
        self.pixels_read.fetch_add(1, Ordering::Relaxed);
        self.inner.value(x, y, channel)
    }

    fn copy_rect(&self, channel: Channel, rect: Rect, out: ArrayViewMut2<f32>) {
        self.pixels_read
            .fetch_add(rect.area() as u64, Ordering::Relaxed);
        self.inner.copy_rect(channel, rect, out);
    }
}
