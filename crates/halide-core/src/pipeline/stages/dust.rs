use crate::buffer::PixelBuffer;
use crate::pipeline::stage::{Stage, StageContext};
use crate::texture::scatter_dust;

/// Dust and scratches, only for vintage and retro stocks.
pub struct Dust;

impl Stage for Dust {
    fn name(&self) -> &str {
        "dust"
    }

    fn apply(&self, input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        let amount = ctx.options.dust_amount;
        if amount <= 0.0 || !ctx.filter.takes_dust() {
            return input;
        }
        scatter_dust(input, amount, &mut *ctx.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::options::ProcessingOptions;
    use crate::pipeline::stage::run_stage;

    fn dusty() -> ProcessingOptions {
        ProcessingOptions {
            dust_amount: 1.0,
            ..Default::default()
        }
    }

    fn gray() -> PixelBuffer {
        PixelBuffer::filled(600, 400, Rgba8::rgb(80, 80, 80))
    }

    #[test]
    fn vintage_gets_dust() {
        assert_ne!(run_stage(&Dust, gray(), "vintage-70s", &dusty(), 2), gray());
        assert_ne!(run_stage(&Dust, gray(), "retro-fade", &dusty(), 2), gray());
    }

    #[test]
    fn other_categories_stay_clean() {
        for id in ["kodak-portra", "ilford-bw", "none", "cinematic"] {
            assert_eq!(run_stage(&Dust, gray(), id, &dusty(), 2), gray(), "{id}");
        }
    }

    #[test]
    fn zero_amount_stays_clean() {
        let out = run_stage(&Dust, gray(), "vintage-70s", &ProcessingOptions::default(), 2);
        assert_eq!(out, gray());
    }
}
