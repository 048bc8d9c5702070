use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::to_u8;
use crate::pipeline::stage::{Stage, StageContext};

pub struct ColorGradeStage;

impl Stage for ColorGradeStage {
    fn name(&self) -> &str {
        "color_grade"
    }

    fn apply(&self, mut input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        let grade = &ctx.filter.grade;
        if grade.is_identity() {
            return input;
        }
        let m = grade.matrix();
        input.data.par_chunks_exact_mut(4).for_each(|px| {
            let [r, g, b] = m.apply(px[0] as f32, px[1] as f32, px[2] as f32);
            px[0] = to_u8(r);
            px[1] = to_u8(g);
            px[2] = to_u8(b);
        });
        input
    }
}
