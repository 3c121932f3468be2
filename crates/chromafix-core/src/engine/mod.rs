mod driver;
mod types;

pub use types::{EngineStage, NoOpReporter, ProgressReporter, Viewport};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::{s, Array2, ArrayViewMut2, Axis};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cache::{margin_for, SourceWindow, TileCache, TileCacheStats, TileKey, WindowPolicy};
use crate::config::{CorrectionParams, EngineConfig, PreviewConfig};
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{ChromaError, Result};
use crate::frame::{Frame, Raster, SourceRaster};
use crate::geom::Rect;
use crate::preview::boost_saturation;
use crate::resample::Interpolation;
use crate::shift::ShiftModel;

use driver::{blit, passthrough_raster, render_block, render_raster_block, Lattice};

/// Everything a single pass needs, derived from the parameters at the
/// start of the pass.
struct Pass {
    model: ShiftModel,
    interpolation: Interpolation,
    margin: usize,
}

impl Pass {
    fn new(params: &CorrectionParams, width: usize, height: usize) -> Result<Self> {
        params.validate(width, height)?;
        let model = ShiftModel::new(&params.shift, width, height);
        let margin = margin_for(&model, params.interpolation);
        Ok(Self {
            model,
            interpolation: params.interpolation,
            margin,
        })
    }
}

/// Chromatic aberration correction engine.
///
/// Final renders borrow the engine immutably and can run from several
/// threads; previews take `&mut self` because they maintain the tile
/// cache.
pub struct CorrectionEngine {
    config: EngineConfig,
    tiles: TileCache,
}

impl CorrectionEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let tiles = TileCache::new(config.tile_cache_capacity);
        Ok(Self { config, tiles })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tile_cache_stats(&self) -> TileCacheStats {
        self.tiles.stats()
    }

    /// Number of preview tiles currently memoized.
    pub fn cached_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Drop every memoized preview tile.
    pub fn invalidate(&mut self) {
        self.tiles.invalidate();
    }

    /// Correct the whole image at full resolution.
    pub fn process_final<S: SourceRaster + ?Sized>(
        &self,
        source: &S,
        params: &CorrectionParams,
    ) -> Result<Raster> {
        self.process_final_reported(source, params, &NoOpReporter)
    }

    /// [`process_final`](Self::process_final) with progress reporting.
    pub fn process_final_reported<S: SourceRaster + ?Sized>(
        &self,
        source: &S,
        params: &CorrectionParams,
        reporter: &dyn ProgressReporter,
    ) -> Result<Raster> {
        let (width, height) = source.dimensions();
        self.process_region_reported(source, Rect::full(width, height), params, reporter)
    }

    /// Correct only `region`; every pixel outside it is passed through.
    /// The result always has the source's dimensions.
    pub fn process_region<S: SourceRaster + ?Sized>(
        &self,
        source: &S,
        region: Rect,
        params: &CorrectionParams,
    ) -> Result<Raster> {
        self.process_region_reported(source, region, params, &NoOpReporter)
    }

    pub fn process_region_reported<S: SourceRaster + ?Sized>(
        &self,
        source: &S,
        region: Rect,
        params: &CorrectionParams,
        reporter: &dyn ProgressReporter,
    ) -> Result<Raster> {
        let (width, height) = source.dimensions();
        let pass = Pass::new(params, width, height)?;
        let full = Lattice::dense(Rect::full(width, height));
        let mut output = passthrough_raster(source, &full, full.bounds());

        let region = region.clamp_to(width, height);
        if region.is_empty() {
            return Ok(output);
        }

        let tile = self.config.tile_size;
        let bands = region.bands(tile);
        let parallel = self.config.parallel
            && region.area() >= PARALLEL_PIXEL_THRESHOLD
            && bands.len() > 1;

        info!(
            width,
            height,
            region = %region,
            mode = %params.shift.mode,
            interpolation = %pass.interpolation,
            margin = pass.margin,
            bands = bands.len(),
            parallel,
            "Correcting chromatic aberration"
        );
        reporter.begin_stage(EngineStage::Correcting, Some(bands.len()));

        let budget = self.config.window_budget_pixels;
        let policy = self.config.final_policy;

        // Bands write straight into disjoint row chunks of the output.
        let rows = region.y..region.bottom();
        let cols = region.x..region.right();
        let mut red = output.red.data.slice_mut(s![rows.clone(), cols.clone()]);
        let mut blue = output.blue.data.slice_mut(s![rows, cols]);
        let chunks = bands
            .iter()
            .copied()
            .zip(red.axis_chunks_iter_mut(Axis(0), tile))
            .zip(blue.axis_chunks_iter_mut(Axis(0), tile));

        if parallel {
            let done = AtomicUsize::new(0);
            chunks.par_bridge().for_each(|((band, red), blue)| {
                let mut window = SourceWindow::new(source, policy, budget);
                render_band(&mut window, &pass, &full, band, tile, red, blue);
                reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
            });
        } else {
            let mut window = SourceWindow::new(source, policy, budget);
            for (i, ((band, red), blue)) in chunks.enumerate() {
                render_band(&mut window, &pass, &full, band, tile, red, blue);
                reporter.advance(i + 1);
            }
            let stats = window.stats();
            debug!(
                hits = stats.hits,
                misses = stats.misses,
                pixels_loaded = stats.pixels_loaded,
                "Source window statistics"
            );
        }

        reporter.finish_stage();
        info!("Correction complete");
        Ok(output)
    }

    /// Render `viewport` with the values the final render would produce at
    /// the same source positions. Tiles are memoized across calls until
    /// the parameters, the raster shape, or [`invalidate`](Self::invalidate)
    /// change them.
    pub fn process_preview<S: SourceRaster + ?Sized>(
        &mut self,
        source: &S,
        viewport: &Viewport,
        params: &CorrectionParams,
    ) -> Result<Raster> {
        let step = viewport.step;
        if step == 0 {
            return Err(ChromaError::InvalidViewport(
                "decimation step must be at least 1".into(),
            ));
        }
        let (width, height) = source.dimensions();
        let region = viewport
            .region
            .intersect(&Rect::full(width, height))
            .ok_or_else(|| {
                ChromaError::InvalidViewport(format!(
                    "viewport {} does not intersect the {width}x{height} raster",
                    viewport.region
                ))
            })?;
        let pass = Pass::new(params, width, height)?;

        // Global lattice through the viewport's phase, so that tiles are
        // shared between viewports that pan over the same lattice.
        let (phase_x, phase_y) = (region.x % step, region.y % step);
        let lattice = Lattice {
            x0: phase_x,
            y0: phase_y,
            step,
            cols: (width - phase_x).div_ceil(step),
            rows: (height - phase_y).div_ceil(step),
        };
        let view = Rect::new(
            region.x / step,
            region.y / step,
            region.width.div_ceil(step),
            region.height.div_ceil(step),
        );

        let fingerprint = preview_fingerprint(params, source);
        let tile = self.config.tile_size;
        let mut window =
            SourceWindow::new(source, WindowPolicy::Replace, self.config.window_budget_pixels);

        info!(
            region = %region,
            step,
            margin = pass.margin,
            interpolation = %pass.interpolation,
            "Rendering preview"
        );

        let depth = source.bit_depth();
        let plane = || Frame::new(Array2::zeros((view.height, view.width)), depth);
        let mut output = Raster {
            red: plane(),
            green: plane(),
            blue: plane(),
            alpha: source.has_alpha().then(plane),
        };

        let (mut hits, mut misses) = (0usize, 0usize);
        for row in view.y / tile..=(view.bottom() - 1) / tile {
            for col in view.x / tile..=(view.right() - 1) / tile {
                let Some(tile_rect) =
                    Rect::new(col * tile, row * tile, tile, tile).intersect(&lattice.bounds())
                else {
                    continue;
                };
                let key = TileKey {
                    phase_x,
                    phase_y,
                    step,
                    col,
                    row,
                };
                let rendered = match self.tiles.get(fingerprint, &key) {
                    Some(cached) => {
                        hits += 1;
                        cached
                    }
                    None => {
                        misses += 1;
                        let fresh = Arc::new(render_raster_block(
                            source,
                            &mut window,
                            &pass.model,
                            pass.interpolation,
                            pass.margin,
                            &lattice,
                            tile_rect,
                        ));
                        self.tiles.insert(fingerprint, key, Arc::clone(&fresh));
                        fresh
                    }
                };
                blit(&rendered, tile_rect, &mut output, view);
            }
        }
        debug!(hits, misses, cached = self.tiles.len(), "Preview tiles");

        Ok(output)
    }

    /// Preview followed by the display-only saturation adjustment. The
    /// memoized tiles stay unadjusted.
    pub fn process_preview_display<S: SourceRaster + ?Sized>(
        &mut self,
        source: &S,
        viewport: &Viewport,
        params: &CorrectionParams,
        display: &PreviewConfig,
    ) -> Result<Raster> {
        display.validate()?;
        let raster = self.process_preview(source, viewport, params)?;
        if display.saturation == 0.0 {
            return Ok(raster);
        }
        Ok(boost_saturation(&raster, display.saturation))
    }
}

impl Default for CorrectionEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let tiles = TileCache::new(config.tile_cache_capacity);
        Self { config, tiles }
    }
}

/// Render one band of `lattice` tile by tile into `red` and `blue`, whose
/// origin is the band's top-left corner.
fn render_band<S: SourceRaster + ?Sized>(
    window: &mut SourceWindow<'_, S>,
    pass: &Pass,
    lattice: &Lattice,
    band: Rect,
    tile: usize,
    mut red: ArrayViewMut2<f32>,
    mut blue: ArrayViewMut2<f32>,
) {
    for block in band.tiles(tile) {
        let (y, x) = (block.y - band.y, block.x - band.x);
        let (h, w) = (block.height, block.width);
        render_block(
            window,
            &pass.model,
            pass.interpolation,
            pass.margin,
            lattice,
            block,
            red.slice_mut(s![y..y + h, x..x + w]),
            blue.slice_mut(s![y..y + h, x..x + w]),
        );
    }
}

/// Parameters plus the raster shape: a tile rendered for one image is never
/// valid for another.
fn preview_fingerprint<S: SourceRaster + ?Sized>(params: &CorrectionParams, source: &S) -> u64 {
    let mut hasher = DefaultHasher::new();
    params.fingerprint().hash(&mut hasher);
    source.dimensions().hash(&mut hasher);
    source.has_alpha().hash(&mut hasher);
    source.bit_depth().hash(&mut hasher);
    hasher.finish()
}
