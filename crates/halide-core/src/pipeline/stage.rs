use rand::RngCore;

use crate::buffer::PixelBuffer;
use crate::filters::FilterDescriptor;
use crate::options::ProcessingOptions;
use crate::texture::GrainCache;

/// Everything a stage may read besides the pixels.
pub struct StageContext<'a> {
    pub filter: &'static FilterDescriptor,
    pub options: &'a ProcessingOptions,
    pub rng: &'a mut dyn RngCore,
    pub grain_cache: &'a GrainCache,
}

/// A single step in the film pipeline.
///
/// Stages never fail: every numeric operation is clamped, and a stage
/// that has nothing to do returns its input untouched.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer;
}

/// Runs one stage in isolation with a seeded RNG and a fresh grain cache.
#[cfg(test)]
pub(crate) fn run_stage(
    stage: &dyn Stage,
    input: PixelBuffer,
    filter_id: &str,
    options: &ProcessingOptions,
    seed: u64,
) -> PixelBuffer {
    use rand::SeedableRng;

    let cache = GrainCache::default();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut ctx = StageContext {
        filter: crate::filters::lookup(filter_id),
        options,
        rng: &mut rng,
        grain_cache: &cache,
    };
    stage.apply(input, &mut ctx)
}
