use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::{mix, screen, to_u8};
use crate::filters::CornerLeak;

/// Edge a side leak bleeds in from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Straight-alpha gradient stop: (offset, [r, g, b], alpha).
type Stop = (f32, [f32; 3], f32);

const SIDE_STOPS: [Stop; 3] = [
    (0.0, [255.0, 60.0, 20.0], 0.5),
    (0.5, [255.0, 180.0, 50.0], 0.3),
    (1.0, [255.0, 255.0, 255.0], 0.0),
];

/// Radius of the corner glow as a fraction of image width.
const CORNER_RADIUS: f32 = 0.6;

fn sample(stops: &[Stop], t: f32) -> ([f32; 3], f32) {
    let t = t.clamp(0.0, 1.0);
    for pair in stops.windows(2) {
        let (t0, c0, a0) = pair[0];
        let (t1, c1, a1) = pair[1];
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let c = [
                c0[0] + (c1[0] - c0[0]) * f,
                c0[1] + (c1[1] - c0[1]) * f,
                c0[2] + (c1[2] - c0[2]) * f,
            ];
            return (c, a0 + (a1 - a0) * f);
        }
    }
    let (_, c, a) = stops[stops.len() - 1];
    (c, a)
}

/// Warm radial glow anchored near one corner, painted source-over.
///
/// The glow fades from `(255,200,100)` at full `intensity` through
/// `(255,150,50)` at half intensity to nothing at 0.6 x width.
pub fn corner_leak(mut buf: PixelBuffer, leak: &CornerLeak) -> PixelBuffer {
    let intensity = leak.intensity.clamp(0.0, 1.0);
    if intensity <= 0.0 {
        return buf;
    }
    let (w, h) = (buf.width as f32, buf.height as f32);
    let (fx, fy) = leak.corner.anchor();
    let (cx, cy) = (w * fx, h * fy);
    let radius = w * CORNER_RADIUS;
    let stops: [Stop; 3] = [
        (0.0, [255.0, 200.0, 100.0], intensity),
        (0.5, [255.0, 150.0, 50.0], intensity * 0.5),
        // fading to transparent keeps the last stop's hue
        (1.0, [255.0, 150.0, 50.0], 0.0),
    ];

    buf.par_rows_mut().for_each(|(y, row)| {
        let dy = y as f32 + 0.5 - cy;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let dx = x as f32 + 0.5 - cx;
            let t = (dx * dx + dy * dy).sqrt() / radius;
            if t >= 1.0 {
                continue;
            }
            let (color, alpha) = sample(&stops, t);
            for c in 0..3 {
                px[c] = to_u8(mix(px[c] as f32, color[c], alpha));
            }
        }
    });
    buf
}

/// Orange-to-amber linear leak over `width_frac` of the image from one
/// side, screen blended.
pub fn side_leak(mut buf: PixelBuffer, side: Side, width_frac: f32) -> PixelBuffer {
    let w = buf.width as f32;
    let span = w * width_frac.clamp(0.0, 1.0);
    if span <= 0.0 {
        return buf;
    }
    // Gradient depends only on x, so precompute one row of colors.
    let ramp: Vec<Option<([f32; 3], f32)>> = (0..buf.width)
        .map(|x| {
            let cx = x as f32 + 0.5;
            let dist = match side {
                Side::Left => cx,
                Side::Right => w - cx,
            };
            (dist <= span).then(|| sample(&SIDE_STOPS, dist / span))
        })
        .collect();

    buf.par_rows_mut().for_each(|(_, row)| {
        for (px, stop) in row.chunks_exact_mut(4).zip(&ramp) {
            let Some((color, alpha)) = stop else {
                continue;
            };
            for c in 0..3 {
                let base = px[c] as f32;
                px[c] = to_u8(mix(base, screen(base, color[c]), *alpha));
            }
        }
    });
    buf
}
