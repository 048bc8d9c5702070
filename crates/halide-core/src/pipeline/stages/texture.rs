use crate::buffer::PixelBuffer;
use crate::filters::TextureKind;
use crate::pipeline::stage::{Stage, StageContext};
use crate::pipeline::stages::grain::add_grain;
use crate::texture::corner_leak;

/// The filter's own texture: base grain, and for some stocks a corner leak.
pub struct FilterTexture;

impl Stage for FilterTexture {
    fn name(&self) -> &str {
        "texture"
    }

    fn apply(&self, input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        match ctx.filter.texture {
            TextureKind::None => input,
            TextureKind::Grain { amount } => add_grain(input, amount, ctx),
            TextureKind::GrainAndLeak { amount, leak } => {
                let grained = add_grain(input, amount, ctx);
                corner_leak(grained, &leak)
            }
        }
    }
}
