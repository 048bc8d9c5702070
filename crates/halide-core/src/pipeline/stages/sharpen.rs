use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::to_u8;
use crate::pipeline::stage::{Stage, StageContext};

/// Share of the kernel response mixed into the original.
const MIX: f32 = 0.2;

/// 3x3 sharpen (center 5, orthogonal neighbors -1) on RGB, blended 20/80
/// with the original. Border pixels and alpha are left alone.
pub struct Sharpen;

impl Stage for Sharpen {
    fn name(&self) -> &str {
        "sharpen"
    }

    fn apply(&self, mut input: PixelBuffer, _ctx: &mut StageContext<'_>) -> PixelBuffer {
        let (w, h) = (input.width as usize, input.height as usize);
        if w < 3 || h < 3 {
            return input;
        }
        let src = input.data.clone();
        let stride = w * 4;

        input
            .par_rows_mut()
            .filter(|(y, _)| *y > 0 && *y < h - 1)
            .for_each(|(y, row)| {
                let up = &src[(y - 1) * stride..y * stride];
                let mid = &src[y * stride..(y + 1) * stride];
                let down = &src[(y + 1) * stride..(y + 2) * stride];
                for x in 1..w - 1 {
                    let i = x * 4;
                    for c in i..i + 3 {
                        let v = mid[c] as f32 * 5.0
                            - up[c] as f32
                            - down[c] as f32
                            - mid[c - 4] as f32
                            - mid[c + 4] as f32;
                        row[c] = to_u8(mid[c] as f32 * (1.0 - MIX) + v * MIX);
                    }
                }
            });
        input
    }
}
