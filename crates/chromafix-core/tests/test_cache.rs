mod common;

use common::{textured_raster, CountingSource};

use chromafix_core::cache::{margin_for, SourceWindow, WindowPolicy};
use chromafix_core::frame::Channel;
use chromafix_core::geom::Rect;
use chromafix_core::resample::Interpolation;
use chromafix_core::shift::{AxisShift, ShiftModel, ShiftParams};

// ---------------------------------------------------------------------------
// margin_for
// ---------------------------------------------------------------------------

#[test]
fn test_margin_is_kernel_support_for_identity() {
    let model = ShiftModel::identity(50, 50);
    assert_eq!(margin_for(&model, Interpolation::Nearest), 0);
    assert_eq!(margin_for(&model, Interpolation::Linear), 1);
    assert_eq!(margin_for(&model, Interpolation::Cubic), 2);
}

#[test]
fn test_margin_grows_with_shift_magnitude() {
    let small = ShiftModel::new(
        &ShiftParams::directional(AxisShift::new(1.0, 0.0), AxisShift::default()),
        50,
        50,
    );
    let large = ShiftModel::new(
        &ShiftParams::directional(AxisShift::new(12.5, 0.0), AxisShift::new(0.0, -3.0)),
        50,
        50,
    );
    // A whole-pixel displacement is rounded up past the float slack.
    assert_eq!(margin_for(&small, Interpolation::Cubic), 2 + 2);
    assert_eq!(margin_for(&large, Interpolation::Cubic), 13 + 2);
    assert_eq!(margin_for(&large, Interpolation::Nearest), 13);
}

// ---------------------------------------------------------------------------
// SourceWindow
// ---------------------------------------------------------------------------

#[test]
fn test_window_reads_match_source() {
    let raster = textured_raster(40, 30, false);
    let mut window = SourceWindow::new(&raster, WindowPolicy::Sliding, 10_000);
    window.ensure(Rect::new(10, 5, 8, 8), 3);
    assert_eq!(window.required(), Rect::new(7, 2, 14, 14));
    for y in 2..16 {
        for x in 7..21 {
            assert_eq!(window.read(x, y, Channel::Red), raster.red.data[[y, x]]);
            assert_eq!(window.read(x, y, Channel::Blue), raster.blue.data[[y, x]]);
        }
    }
}

#[test]
fn test_window_requirement_is_clamped_to_raster() {
    let raster = textured_raster(20, 20, false);
    let mut window = SourceWindow::new(&raster, WindowPolicy::Replace, 10_000);
    window.ensure(Rect::new(0, 15, 5, 5), 4);
    assert_eq!(window.required(), Rect::new(0, 11, 9, 9));
}

#[test]
#[should_panic(expected = "outside ensured region")]
fn test_window_read_outside_requirement_panics() {
    let raster = textured_raster(20, 20, false);
    let mut window = SourceWindow::new(&raster, WindowPolicy::Sliding, 10_000);
    window.ensure(Rect::new(5, 5, 4, 4), 1);
    window.read(10, 6, Channel::Red);
}

#[test]
#[should_panic(expected = "outside ensured region")]
fn test_window_read_before_ensure_panics() {
    let raster = textured_raster(8, 8, false);
    let window = SourceWindow::new(&raster, WindowPolicy::Sliding, 10_000);
    window.read(0, 0, Channel::Blue);
}

#[test]
#[should_panic(expected = "only shifted channels")]
fn test_window_rejects_unshifted_channels() {
    let raster = textured_raster(8, 8, false);
    let mut window = SourceWindow::new(&raster, WindowPolicy::Sliding, 10_000);
    window.ensure(Rect::new(0, 0, 8, 8), 0);
    window.read(1, 1, Channel::Green);
}

#[test]
fn test_window_hits_do_not_reload() {
    let source = CountingSource::new(textured_raster(30, 30, false));
    let mut window = SourceWindow::new(&source, WindowPolicy::Sliding, 10_000);
    window.ensure(Rect::new(0, 0, 30, 10), 2);
    let after_first = source.reads();
    window.ensure(Rect::new(4, 2, 10, 5), 2);
    assert_eq!(source.reads(), after_first);

    let stats = window.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_window_sweep_loads_each_row_once() {
    let source = CountingSource::new(textured_raster(32, 64, false));
    let mut window = SourceWindow::new(&source, WindowPolicy::Sliding, 32 * 24);
    for band in Rect::full(32, 64).bands(8) {
        window.ensure(band, 2);
        assert!(window.extent().area() <= 32 * 24);
    }
    // Two cached channels, every source pixel loaded exactly once.
    assert_eq!(window.stats().pixels_loaded, 32 * 64);
    assert_eq!(source.reads(), 2 * 32 * 64);
}

#[test]
fn test_window_growing_margin_is_honored() {
    // Same region, larger margin: the window must grow instead of reusing
    // the smaller extent.
    let raster = textured_raster(60, 60, false);
    let mut window = SourceWindow::new(&raster, WindowPolicy::Sliding, 100_000);
    let region = Rect::new(20, 20, 10, 10);
    window.ensure(region, 1);
    window.ensure(region, 9);
    assert!(window.extent().contains_rect(&Rect::new(11, 11, 28, 28)));
    assert_eq!(window.read(11, 38, Channel::Red), raster.red.data[[38, 11]]);
}

#[test]
fn test_replace_policy_swaps_extent_when_over_budget() {
    let raster = textured_raster(100, 100, false);
    let mut window = SourceWindow::new(&raster, WindowPolicy::Replace, 400);
    window.ensure(Rect::new(0, 0, 10, 10), 0);
    window.ensure(Rect::new(80, 80, 10, 10), 0);
    assert_eq!(window.extent(), Rect::new(80, 80, 10, 10));
    assert_eq!(window.read(85, 89, Channel::Blue), raster.blue.data[[89, 85]]);
}

#[test]
fn test_replace_policy_does_not_load_gap_between_requirements() {
    let source = CountingSource::new(textured_raster(100, 20, false));
    let mut window = SourceWindow::new(&source, WindowPolicy::Replace, 10_000);
    window.ensure(Rect::new(0, 0, 3, 3), 0);
    window.ensure(Rect::new(40, 0, 3, 3), 0);
    // The union would fit the budget but is mostly unused pixels.
    assert_eq!(window.extent(), Rect::new(40, 0, 3, 3));
    assert_eq!(window.stats().pixels_loaded, 2 * 9);

    // Abutting requirements still grow the window.
    window.ensure(Rect::new(43, 0, 3, 3), 0);
    assert_eq!(window.extent(), Rect::new(40, 0, 6, 3));
    assert_eq!(window.read(44, 2, Channel::Red), source.inner.red.data[[2, 44]]);
    assert_eq!(window.stats().pixels_loaded, 3 * 9);
}

#[test]
fn test_requirement_larger_than_budget_is_still_honored() {
    let raster = textured_raster(50, 50, false);
    let mut window = SourceWindow::new(&raster, WindowPolicy::Sliding, 16);
    window.ensure(Rect::new(10, 10, 20, 20), 2);
    assert!(window.extent().contains_rect(&window.required()));
    assert_eq!(window.read(8, 31, Channel::Red), raster.red.data[[31, 8]]);
}
