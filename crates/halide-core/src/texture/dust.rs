use rand::{Rng, RngCore};

use crate::buffer::PixelBuffer;
use crate::color::{mix, overlay, to_u8};

/// Image area (in pixels) per dust speck at amount 1.0.
pub const AREA_PER_SPECK: f64 = 50_000.0;
const SPECK_ALPHA: f32 = 0.6;
const SCRATCH_ALPHA: f32 = 0.3;
const SCRATCH_MAX_LEN: f32 = 50.0;
const SCRATCH_MAX_DRIFT: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Speck {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scratch {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Number of specks for an image of `w` x `h` at `amount`.
pub fn speck_count(w: u32, h: u32, amount: f32) -> usize {
    (w as f64 * h as f64 / AREA_PER_SPECK * amount.clamp(0.0, 1.0) as f64).floor() as usize
}

/// Scatters white specks and a fifth as many short vertical scratches,
/// overlay blended.
pub fn scatter_dust(mut buf: PixelBuffer, amount: f32, rng: &mut dyn RngCore) -> PixelBuffer {
    let count = speck_count(buf.width, buf.height, amount);
    if count == 0 {
        return buf;
    }
    let (w, h) = (buf.width as f32, buf.height as f32);

    let specks: Vec<Speck> = (0..count)
        .map(|_| Speck {
            x: rng.random::<f32>() * w,
            y: rng.random::<f32>() * h,
            radius: rng.random::<f32>() * 2.0 + 0.5,
        })
        .collect();
    let scratches: Vec<Scratch> = (0..count.div_ceil(5))
        .map(|_| {
            let x0 = rng.random::<f32>() * w;
            let y0 = rng.random::<f32>() * h;
            let len = rng.random::<f32>() * SCRATCH_MAX_LEN;
            let drift = (rng.random::<f32>() - 0.5) * SCRATCH_MAX_DRIFT;
            Scratch {
                x0,
                y0,
                x1: x0 + drift,
                y1: y0 + len,
            }
        })
        .collect();

    for s in &specks {
        paint_speck(&mut buf, s);
    }
    for s in &scratches {
        paint_scratch(&mut buf, s);
    }
    buf
}

fn overlay_white(px: &mut [u8], alpha: f32) {
    for c in &mut px[..3] {
        let base = *c as f32;
        *c = to_u8(mix(base, overlay(base, 255.0), alpha));
    }
}

/// Pixel bounds `[lo, hi)` covering `lo_f..hi_f`, clipped to `0..limit`.
fn span(lo_f: f32, hi_f: f32, limit: u32) -> (u32, u32) {
    let lo = lo_f.floor().max(0.0) as u32;
    let hi = (hi_f.ceil().max(0.0) as u32).min(limit);
    (lo.min(limit), hi)
}

fn paint_speck(buf: &mut PixelBuffer, s: &Speck) {
    let (x0, x1) = span(s.x - s.radius - 1.0, s.x + s.radius + 1.0, buf.width);
    let (y0, y1) = span(s.y - s.radius - 1.0, s.y + s.radius + 1.0, buf.height);
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - s.x;
            let dy = y as f32 + 0.5 - s.y;
            let coverage = (s.radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let i = (y as usize * buf.width as usize + x as usize) * 4;
                overlay_white(&mut buf.data[i..i + 4], SPECK_ALPHA * coverage);
            }
        }
    }
}

fn segment_distance(px: f32, py: f32, s: &Scratch) -> f32 {
    let (vx, vy) = (s.x1 - s.x0, s.y1 - s.y0);
    let len2 = vx * vx + vy * vy;
    let t = if len2 > 0.0 {
        (((px - s.x0) * vx + (py - s.y0) * vy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (s.x0 + t * vx, s.y0 + t * vy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

fn paint_scratch(buf: &mut PixelBuffer, s: &Scratch) {
    let (x0, x1) = span(s.x0.min(s.x1) - 1.0, s.x0.max(s.x1) + 1.0, buf.width);
    let (y0, y1) = span(s.y0.min(s.y1) - 1.0, s.y0.max(s.y1) + 1.0, buf.height);
    for y in y0..y1 {
        for x in x0..x1 {
            // 1px hairline
            let d = segment_distance(x as f32 + 0.5, y as f32 + 0.5, s);
            let coverage = (1.0 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let i = (y as usize * buf.width as usize + x as usize) * 4;
                overlay_white(&mut buf.data[i..i + 4], SCRATCH_ALPHA * coverage);
            }
        }
    }
}
