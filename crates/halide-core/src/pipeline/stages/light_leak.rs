use rand::Rng;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::pipeline::stage::{Stage, StageContext};
use crate::texture::{Side, side_leak};

/// Chance that a requested leak is not rendered at all.
///
/// A requested leak is not guaranteed to show up; the editor has always
/// behaved this way. Kept tunable until the product intent is settled.
pub const LIGHT_LEAK_SKIP_PROBABILITY: f32 = 0.3;
const MIN_WIDTH: f32 = 0.2;
const WIDTH_RANGE: f32 = 0.3;

pub struct LightLeak;

impl Stage for LightLeak {
    fn name(&self) -> &str {
        "light_leak"
    }

    fn apply(&self, input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        if !ctx.options.light_leak {
            return input;
        }
        let roll: f32 = ctx.rng.random();
        if roll < LIGHT_LEAK_SKIP_PROBABILITY {
            debug!(roll, "light leak requested but skipped");
            return input;
        }
        let side = if ctx.rng.random_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };
        let width_frac = MIN_WIDTH + ctx.rng.random::<f32>() * WIDTH_RANGE;
        debug!(?side, width_frac, "light leak");
        side_leak(input, side, width_frac)
    }
}
