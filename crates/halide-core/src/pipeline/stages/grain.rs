use crate::buffer::PixelBuffer;
use crate::pipeline::stage::{Stage, StageContext};
use crate::texture::grain::{apply_grain, intensity_bucket};

/// Adds cached grain at `intensity`. Buckets below 1% are a no-op.
pub(crate) fn add_grain(buf: PixelBuffer, intensity: f32, ctx: &mut StageContext<'_>) -> PixelBuffer {
    if intensity_bucket(intensity) == 0 {
        return buf;
    }
    let field = ctx
        .grain_cache
        .get_or_generate(buf.width, buf.height, intensity);
    apply_grain(buf, &field)
}

/// Extra grain requested by the user, stacked on the filter's own.
pub struct Grain;

impl Stage for Grain {
    fn name(&self) -> &str {
        "grain"
    }

    fn apply(&self, input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        let amount = ctx.options.grain_amount;
        if amount <= 0.0 {
            return input;
        }
        add_grain(input, amount, ctx)
    }
}
