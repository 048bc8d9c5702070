use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::to_u8;
use crate::pipeline::stage::{Stage, StageContext};

/// Radial darkening toward the corners, composited by multiply.
///
/// Fully transparent inside a third of the short side, ramping to
/// `vignette_amount` black at 0.8 x the half-diagonal.
pub struct Vignette;

/// Multiplier (1 = untouched) for a pixel center at `(x, y)`.
pub fn vignette_factor(x: f32, y: f32, width: f32, height: f32, amount: f32) -> f32 {
    let (cx, cy) = (width / 2.0, height / 2.0);
    let inner = width.min(height) / 3.0;
    let outer = 0.8 * width.hypot(height) / 2.0;
    let d = (x - cx).hypot(y - cy);
    let t = ((d - inner) / (outer - inner)).clamp(0.0, 1.0);
    1.0 - amount * t
}

impl Stage for Vignette {
    fn name(&self) -> &str {
        "vignette"
    }

    fn apply(&self, mut input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        let amount = ctx.options.vignette_amount;
        if amount <= 0.0 {
            return input;
        }
        let (w, h) = (input.width as f32, input.height as f32);
        input.par_rows_mut().for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let f = vignette_factor(x as f32 + 0.5, py, w, h, amount);
                if f < 1.0 {
                    for c in &mut px[..3] {
                        *c = to_u8(*c as f32 * f);
                    }
                }
            }
        });
        input
    }
}
