use approx::assert_abs_diff_eq;

use chromafix_core::frame::Channel;
use chromafix_core::shift::{AxisShift, ChannelShifts, ShiftMode, ShiftModel, ShiftParams};

// ---------------------------------------------------------------------------
// Lateral
// ---------------------------------------------------------------------------

#[test]
fn test_lateral_border_pixel_moves_by_configured_amount() {
    // 101 px wide: center 50, border distance 50.
    let params = ShiftParams::lateral(AxisShift::uniform(3.0), AxisShift::uniform(-2.0));
    let model = ShiftModel::new(&params, 101, 101);

    let (rx, ry) = model.forward_coordinate(100.0, 0.0, Channel::Red);
    assert_abs_diff_eq!(rx, 103.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ry, -3.0, epsilon = 1e-9);

    let (bx, _) = model.forward_coordinate(0.0, 50.0, Channel::Blue);
    assert_abs_diff_eq!(bx, 2.0, epsilon = 1e-9);
}

#[test]
fn test_lateral_center_does_not_move() {
    let params = ShiftParams::lateral(AxisShift::uniform(5.0), AxisShift::uniform(-5.0));
    let model = ShiftModel::new(&params, 101, 61);
    for channel in Channel::SHIFTED {
        let (x, y) = model.source_coordinate(50.0, 30.0, channel);
        assert_abs_diff_eq!(x, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 30.0, epsilon = 1e-12);
    }
}

#[test]
fn test_lateral_sign_convention() {
    let outward = ShiftModel::new(
        &ShiftParams::lateral(AxisShift::uniform(4.0), AxisShift::default()),
        101,
        101,
    );
    let inward = ShiftModel::new(
        &ShiftParams::lateral(AxisShift::uniform(-4.0), AxisShift::default()),
        101,
        101,
    );
    // A point right of center lands further right for positive amounts and
    // closer to the center for negative ones.
    let (out_x, _) = outward.forward_coordinate(80.0, 50.0, Channel::Red);
    let (in_x, _) = inward.forward_coordinate(80.0, 50.0, Channel::Red);
    assert!(out_x > 80.0, "outward shift moved to {out_x}");
    assert!(in_x < 80.0 && in_x > 50.0, "inward shift moved to {in_x}");
}

#[test]
fn test_lateral_axes_are_independent() {
    let params = ShiftParams::lateral(AxisShift::new(4.0, 0.0), AxisShift::default());
    let model = ShiftModel::new(&params, 101, 101);
    let (x, y) = model.source_coordinate(100.0, 100.0, Channel::Red);
    assert!(x < 100.0);
    assert_abs_diff_eq!(y, 100.0, epsilon = 1e-12);
}

#[test]
fn test_lateral_custom_center() {
    let params = ShiftParams {
        center: Some([20.0, 10.0]),
        ..ShiftParams::lateral(AxisShift::uniform(2.0), AxisShift::default())
    };
    let model = ShiftModel::new(&params, 101, 101);
    let (x, y) = model.source_coordinate(20.0, 10.0, Channel::Red);
    assert_abs_diff_eq!(x, 20.0, epsilon = 1e-12);
    assert_abs_diff_eq!(y, 10.0, epsilon = 1e-12);

    // Farther border along x is 80 px away; it moves the full 2 px.
    let (fx, _) = model.forward_coordinate(100.0, 10.0, Channel::Red);
    assert_abs_diff_eq!(fx, 102.0, epsilon = 1e-9);
}

#[test]
fn test_lateral_max_displacement_is_exact() {
    let params = ShiftParams::lateral(AxisShift::uniform(3.0), AxisShift::default());
    let model = ShiftModel::new(&params, 101, 101);
    // Largest |src - out| is at the border output pixel.
    let expected = 50.0 - 50.0 / 1.06;
    assert_abs_diff_eq!(model.max_displacement(), expected, epsilon = 1e-9);

    let (sx, _) = model.source_coordinate(100.0, 50.0, Channel::Red);
    assert_abs_diff_eq!(100.0 - sx, expected, epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Directional / combined
// ---------------------------------------------------------------------------

#[test]
fn test_directional_subtracts_offset_everywhere() {
    let params = ShiftParams::directional(AxisShift::new(3.0, -1.5), AxisShift::new(-2.0, 0.5));
    let model = ShiftModel::new(&params, 40, 30);
    for (x, y) in [(0.0, 0.0), (17.0, 9.0), (39.0, 29.0)] {
        assert_eq!(model.source_coordinate(x, y, Channel::Red), (x - 3.0, y + 1.5));
        assert_eq!(model.source_coordinate(x, y, Channel::Blue), (x + 2.0, y - 0.5));
    }
    assert_abs_diff_eq!(model.max_displacement(), 3.0, epsilon = 1e-12);
}

#[test]
fn test_mode_selects_active_group() {
    let shifts = ChannelShifts::new(AxisShift::uniform(2.0), AxisShift::uniform(1.0));
    let params = ShiftParams {
        mode: ShiftMode::Lateral,
        lateral: ChannelShifts::default(),
        directional: shifts,
        center: None,
    };
    // Directional amounts are ignored in lateral mode.
    assert!(ShiftModel::new(&params, 50, 50).is_identity());
    assert!(params.is_identity());
}

#[test]
fn test_combined_applies_scale_then_offset() {
    let lateral = ShiftParams::lateral(AxisShift::uniform(3.0), AxisShift::default());
    let params = ShiftParams {
        mode: ShiftMode::Combined,
        directional: ChannelShifts::new(AxisShift::new(1.0, -2.0), AxisShift::default()),
        ..lateral.clone()
    };
    let lateral_only = ShiftModel::new(&lateral, 101, 101);
    let combined = ShiftModel::new(&params, 101, 101);

    let (lx, ly) = lateral_only.source_coordinate(90.0, 10.0, Channel::Red);
    let (cx, cy) = combined.source_coordinate(90.0, 10.0, Channel::Red);
    assert_abs_diff_eq!(cx, lx - 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(cy, ly + 2.0, epsilon = 1e-12);
}

#[test]
fn test_forward_inverts_source() {
    let params = ShiftParams {
        mode: ShiftMode::Combined,
        lateral: ChannelShifts::new(AxisShift::new(2.5, -1.0), AxisShift::new(-3.0, 4.0)),
        directional: ChannelShifts::new(AxisShift::new(0.5, 0.25), AxisShift::new(-1.0, 2.0)),
        center: None,
    };
    let model = ShiftModel::new(&params, 64, 48);
    for channel in Channel::SHIFTED {
        for (x, y) in [(0.0, 0.0), (13.0, 40.0), (63.0, 47.0)] {
            let (sx, sy) = model.source_coordinate(x, y, channel);
            let (fx, fy) = model.forward_coordinate(sx, sy, channel);
            assert_abs_diff_eq!(fx, x, epsilon = 1e-9);
            assert_abs_diff_eq!(fy, y, epsilon = 1e-9);
        }
    }
}

// ---------------------------------------------------------------------------
// Degenerate sizes
// ---------------------------------------------------------------------------

#[test]
fn test_single_row_image_is_identity_vertically() {
    let params = ShiftParams::lateral(AxisShift::uniform(3.0), AxisShift::uniform(3.0));
    let model = ShiftModel::new(&params, 21, 1);
    let (_, y) = model.source_coordinate(20.0, 0.0, Channel::Red);
    assert_eq!(y, 0.0);
}

#[test]
fn test_empty_image_has_no_displacement() {
    let params = ShiftParams::lateral(AxisShift::uniform(3.0), AxisShift::uniform(3.0));
    let model = ShiftModel::new(&params, 0, 0);
    assert_eq!(model.max_displacement(), 0.0);
}
