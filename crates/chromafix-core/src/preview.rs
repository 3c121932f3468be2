use ndarray::Zip;

use crate::frame::Raster;

/// Scale HSV saturation of every pixel by `1 + percent / 100`.
///
/// Display-only: applied to a copy of engine output, never to cached tiles
/// or final renders. Alpha is left untouched.
pub fn boost_saturation(raster: &Raster, percent: f32) -> Raster {
    let factor = 1.0 + percent / 100.0;
    let mut out = raster.clone();
    Zip::from(&mut out.red.data)
        .and(&mut out.green.data)
        .and(&mut out.blue.data)
        .par_for_each(|r, g, b| {
            let (h, s, v) = rgb_to_hsv(*r, *g, *b);
            let (nr, ng, nb) = hsv_to_rgb(h, (s * factor).clamp(0.0, 1.0), v);
            *r = nr;
            *g = ng;
            *b = nb;
        });
    out
}

/// Hue in [0, 6), saturation and value in [0, 1].
fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if max <= 0.0 || delta <= 0.0 {
        return (0.0, 0.0, max);
    }
    let hue = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    (hue, delta / max, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s <= 0.0 {
        return (v, v, v);
    }
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as i32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
