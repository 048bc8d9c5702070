use rayon::prelude::*;

use crate::blur::{Plane, box_blur, box_radius_for_sigma};
use crate::buffer::PixelBuffer;
use crate::color::{luma, mix, screen, to_u8};
use crate::pipeline::stage::{Stage, StageContext};

const MASK_CONTRAST: f32 = 2.0;
const MASK_BRIGHTNESS: f32 = 0.8;
const GLOW_SATURATION: f32 = 2.0;
const GLOW_SIGMA: f32 = 8.0;
const GLOW_OPACITY: f32 = 0.4;
const BLUR_PASSES: usize = 3;

/// Highlight bloom.
///
/// A luminance mask is built from the image pushed through contrast 2.0
/// and brightness 0.8, so only highlights survive. The masked color is
/// blurred, saturated x2, and screened back at 0.4 opacity.
pub struct Halation;

/// Mask weight for one pixel, 0..=1.
fn highlight_mask(r: f32, g: f32, b: f32) -> f32 {
    let lift = |c: f32| (((c / 255.0 - 0.5) * MASK_CONTRAST + 0.5).clamp(0.0, 1.0)) * MASK_BRIGHTNESS;
    luma(lift(r), lift(g), lift(b))
}

impl Stage for Halation {
    fn name(&self) -> &str {
        "halation"
    }

    fn apply(&self, mut input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        if ctx.filter.is_none() {
            return input;
        }
        let (w, h) = (input.width as usize, input.height as usize);
        let mut planes = [Plane::new(w, h), Plane::new(w, h), Plane::new(w, h)];

        {
            let [pr, pg, pb] = &mut planes;
            input
                .data
                .par_chunks(w * 4)
                .zip(pr.data.par_chunks_mut(w))
                .zip(pg.data.par_chunks_mut(w))
                .zip(pb.data.par_chunks_mut(w))
                .for_each(|(((row, r), g), b)| {
                    for (x, px) in row.chunks_exact(4).enumerate() {
                        let (cr, cg, cb) = (px[0] as f32, px[1] as f32, px[2] as f32);
                        let m = highlight_mask(cr, cg, cb) / 255.0;
                        // normalized color scaled by the mask
                        r[x] = cr * m;
                        g[x] = cg * m;
                        b[x] = cb * m;
                    }
                });
        }

        let radius = box_radius_for_sigma(GLOW_SIGMA, BLUR_PASSES);
        for plane in &mut planes {
            box_blur(plane, radius, BLUR_PASSES);
        }

        let [pr, pg, pb] = &planes;
        input
            .par_rows_mut()
            .zip(pr.data.par_chunks(w))
            .zip(pg.data.par_chunks(w))
            .zip(pb.data.par_chunks(w))
            .for_each(|((((_, row), r), g), b)| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let glow = saturate([r[x], g[x], b[x]]);
                    for c in 0..3 {
                        let base = px[c] as f32;
                        px[c] = to_u8(mix(base, screen(base, glow[c] * 255.0), GLOW_OPACITY));
                    }
                }
            });
        input
    }
}

/// Push each channel away from luma, clamped to 0..=1.
fn saturate(rgb: [f32; 3]) -> [f32; 3] {
    let y = luma(rgb[0], rgb[1], rgb[2]);
    rgb.map(|c| (y + GLOW_SATURATION * (c - y)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::options::ProcessingOptions;
    use crate::pipeline::stage::run_stage;

    fn run(buf: PixelBuffer, filter: &str) -> PixelBuffer {
        run_stage(&Halation, buf, filter, &ProcessingOptions::default(), 0)
    }

    #[test]
    fn skipped_for_none() {
        let buf = PixelBuffer::filled(20, 20, Rgba8::rgb(250, 250, 250));
        assert_eq!(run(buf.clone(), "none"), buf);
    }

    #[test]
    fn shadows_produce_no_mask() {
        assert_eq!(highlight_mask(0.0, 0.0, 0.0), 0.0);
        assert_eq!(highlight_mask(60.0, 60.0, 60.0), 0.0);
        assert!((highlight_mask(255.0, 255.0, 255.0) - 0.8).abs() < 1e-5);
    }

    #[test]
    fn dark_image_unchanged() {
        let buf = PixelBuffer::filled(24, 24, Rgba8::rgb(40, 30, 50));
        assert_eq!(run(buf.clone(), "cinestill-800"), buf);
    }

    #[test]
    fn highlight_blooms_into_neighbors() {
        let mut buf = PixelBuffer::filled(64, 64, Rgba8::rgb(20, 20, 20));
        for y in 28..36 {
            for x in 28..36 {
                buf.set_pixel(x, y, [255, 255, 255, 255]);
            }
        }
        let out = run(buf, "kodak-portra");
        // a few pixels outside the highlight pick up glow
        assert!(out.pixel(38, 32)[0] > 20);
        // far corner stays dark
        assert_eq!(out.pixel(0, 0)[0], 20);
    }

    #[test]
    fn gray_stays_gray() {
        let mut buf = PixelBuffer::filled(32, 32, Rgba8::rgb(90, 90, 90));
        buf.set_pixel(16, 16, [240, 240, 240, 255]);
        let out = run(buf, "ilford-bw");
        for px in out.data.chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn saturate_keeps_gray() {
        let out = saturate([0.5, 0.5, 0.5]);
        assert!(out.iter().all(|c| (c - 0.5).abs() < 1e-5));
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn saturate_spreads_channels() {
        let out = saturate([0.6, 0.4, 0.4]);
        assert!(out[0] > 0.6 && out[1] < 0.4);
    }
}
