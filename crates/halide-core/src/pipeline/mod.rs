pub mod stage;
pub mod stages;

use rand::RngCore;
use tracing::{debug, info, warn};

use crate::buffer::PixelBuffer;
use crate::decode::decode_bytes;
use crate::encode::encode_jpeg;
use crate::error::PipelineResult;
use crate::filters;
use crate::options::ProcessingOptions;
use crate::texture::GrainCache;
use stage::{Stage, StageContext};

/// The film look, as an ordered chain of stages.
///
/// ```text
/// Resize -> Sharpen -> Grade -> Halation -> Texture -> Grain
///        -> Light leak -> Vignette -> Dust -> Date stamp
/// ```
///
/// Each stage owns the buffer while it runs and hands it to the next.
/// Developing never fails; only decoding the source bytes can.
pub struct FilmPipeline {
    stages: Vec<Box<dyn Stage>>,
    grain_cache: GrainCache,
}

/// Result of [`FilmPipeline::process_or_original`].
#[derive(Debug)]
pub enum ProcessOutput<'a> {
    Developed(PixelBuffer),
    /// The source could not be decoded and is passed through untouched.
    Original(&'a [u8]),
}

impl ProcessOutput<'_> {
    pub fn is_developed(&self) -> bool {
        matches!(self, ProcessOutput::Developed(_))
    }

    /// Encoded bytes: a fresh JPEG when developed, the source otherwise.
    pub fn to_bytes(&self, quality: u8) -> PipelineResult<Vec<u8>> {
        match self {
            ProcessOutput::Developed(buf) => encode_jpeg(buf, quality),
            ProcessOutput::Original(bytes) => Ok(bytes.to_vec()),
        }
    }
}

impl FilmPipeline {
    pub fn new() -> Self {
        Self::with_grain_cache(GrainCache::default())
    }

    pub fn with_grain_cache(grain_cache: GrainCache) -> Self {
        Self {
            stages: vec![
                Box::new(stages::Resize),
                Box::new(stages::Sharpen),
                Box::new(stages::ColorGradeStage),
                Box::new(stages::Halation),
                Box::new(stages::FilterTexture),
                Box::new(stages::Grain),
                Box::new(stages::LightLeak),
                Box::new(stages::Vignette),
                Box::new(stages::Dust),
                Box::new(stages::DateStampStage),
            ],
            grain_cache,
        }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn grain_cache(&self) -> &GrainCache {
        &self.grain_cache
    }

    /// Run every stage over a decoded buffer.
    pub fn develop(
        &self,
        input: PixelBuffer,
        filter_id: &str,
        options: &ProcessingOptions,
        rng: &mut dyn RngCore,
    ) -> PixelBuffer {
        let filter = filters::lookup(filter_id);
        let options = options.clone().sanitized();
        info!(
            filter = filter.id,
            width = input.width,
            height = input.height,
            "developing"
        );
        let t0 = std::time::Instant::now();

        let mut ctx = StageContext {
            filter,
            options: &options,
            rng,
            grain_cache: &self.grain_cache,
        };
        let mut current = input;
        for stage in &self.stages {
            let t = std::time::Instant::now();
            current = stage.apply(current, &mut ctx);
            debug!(
                stage = stage.name(),
                elapsed_ms = t.elapsed().as_millis(),
                "stage done"
            );
        }

        info!(
            width = current.width,
            height = current.height,
            elapsed_ms = t0.elapsed().as_millis(),
            "developed"
        );
        current
    }

    /// Decode `raw` and develop it.
    pub fn process(
        &self,
        raw: &[u8],
        filter_id: &str,
        options: &ProcessingOptions,
        rng: &mut dyn RngCore,
    ) -> PipelineResult<PixelBuffer> {
        let buf = decode_bytes(raw)?;
        Ok(self.develop(buf, filter_id, options, rng))
    }

    /// Like [`process`](Self::process), but an undecodable source comes
    /// back unchanged instead of as an error.
    pub fn process_or_original<'a>(
        &self,
        raw: &'a [u8],
        filter_id: &str,
        options: &ProcessingOptions,
        rng: &mut dyn RngCore,
    ) -> ProcessOutput<'a> {
        match self.process(raw, filter_id, options, rng) {
            Ok(buf) => ProcessOutput::Developed(buf),
            Err(e) => {
                warn!(error = %e, bytes = raw.len(), "develop failed, keeping original");
                ProcessOutput::Original(raw)
            }
        }
    }
}

impl Default for FilmPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::encode::encode_png;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Smooth diagonal gradient with some color, so every stage has work.
    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let r = (x * 255 / w.max(1)) as u8;
                let g = (y * 255 / h.max(1)) as u8;
                buf.set_pixel(x, y, [r, g, 128, 255]);
            }
        }
        buf
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn stage_ordering() {
        let pipeline = FilmPipeline::new();
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "resize",
                "sharpen",
                "color_grade",
                "halation",
                "texture",
                "grain",
                "light_leak",
                "vignette",
                "dust",
                "date_stamp",
            ]
        );
    }

    #[test]
    fn none_with_zero_amounts_only_sharpens() {
        let pipeline = FilmPipeline::new();
        let input = gradient(64, 48);
        let out = pipeline.develop(input.clone(), "none", &ProcessingOptions::default(), &mut rng(1));

        let cache = GrainCache::default();
        let options = ProcessingOptions::default();
        let mut r = rng(1);
        let mut ctx = StageContext {
            filter: filters::lookup("none"),
            options: &options,
            rng: &mut r,
            grain_cache: &cache,
        };
        let sharpened = stages::Sharpen.apply(input, &mut ctx);
        assert_eq!(out, sharpened);
    }

    #[test]
    fn unknown_filter_develops_like_none() {
        let pipeline = FilmPipeline::new();
        let input = gradient(32, 32);
        let options = ProcessingOptions::default();
        let a = pipeline.develop(input.clone(), "no-such-stock", &options, &mut rng(5));
        let b = pipeline.develop(input, "none", &options, &mut rng(5));
        assert_eq!(a, b);
    }

    #[test]
    fn large_bw_capture_end_to_end() {
        let pipeline = FilmPipeline::new();
        let input = PixelBuffer::filled(4000, 3000, Rgba8::rgb(180, 140, 110));
        let options = ProcessingOptions {
            grain_amount: 0.5,
            vignette_amount: 0.5,
            ..Default::default()
        };
        let out = pipeline.develop(input, "ilford-bw", &options, &mut rng(9));

        assert!(out.width.max(out.height) <= 3840);
        assert_eq!((out.width, out.height), (3840, 2880));
        for px in out.data.chunks_exact(4) {
            assert!(px[0] == px[1] && px[1] == px[2], "not gray: {px:?}");
        }
        let (w, h) = (out.width, out.height);
        let center = out.mean_rgb(w / 2 - 50, h / 2 - 50, 100, 100)[0];
        for (x, y) in [(0, 0), (w - 100, 0), (0, h - 100), (w - 100, h - 100)] {
            let corner = out.mean_rgb(x, y, 100, 100)[0];
            assert!(corner < center, "corner {corner} center {center}");
        }
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let pipeline = FilmPipeline::new();
        let options = ProcessingOptions {
            grain_amount: 0.3,
            dust_amount: 0.8,
            vignette_amount: 0.4,
            light_leak: true,
            ..Default::default()
        };
        let a = pipeline.develop(gradient(300, 200), "vintage-70s", &options, &mut rng(77));
        let b = FilmPipeline::new().develop(gradient(300, 200), "vintage-70s", &options, &mut rng(77));
        assert_eq!(a, b);
    }

    #[test]
    fn warm_grain_cache_keeps_seed_deterministic() {
        let pipeline = FilmPipeline::new();
        let input = PixelBuffer::filled(600, 400, Rgba8::rgb(128, 128, 128));
        let options = ProcessingOptions {
            grain_amount: 0.3,
            dust_amount: 0.8,
            light_leak: true,
            ..Default::default()
        };
        let cold = pipeline.develop(input.clone(), "vintage-70s", &options, &mut rng(77));
        assert!(!pipeline.grain_cache().is_empty());
        let warm = pipeline.develop(input, "vintage-70s", &options, &mut rng(77));
        assert_eq!(cold, warm);
    }

    #[test]
    fn grain_fields_are_cached_per_size() {
        let pipeline = FilmPipeline::new();
        let options = ProcessingOptions {
            grain_amount: 0.4,
            ..Default::default()
        };
        pipeline.develop(gradient(40, 30), "kodak-portra", &options, &mut rng(1));
        // base grain of the stock plus the requested extra grain
        assert_eq!(pipeline.grain_cache().len(), 2);
        pipeline.develop(gradient(40, 30), "kodak-portra", &options, &mut rng(2));
        assert_eq!(pipeline.grain_cache().len(), 2);
    }

    #[test]
    fn process_decodes_then_develops() {
        let pipeline = FilmPipeline::new();
        let bytes = encode_png(&gradient(20, 10)).unwrap();
        let out = pipeline
            .process(&bytes, "kodak-gold", &ProcessingOptions::default(), &mut rng(3))
            .unwrap();
        assert_eq!((out.width, out.height), (20, 10));
    }

    #[test]
    fn undecodable_input_passes_through() {
        let pipeline = FilmPipeline::new();
        let raw = b"not a photo";
        let out =
            pipeline.process_or_original(raw, "kodak-gold", &ProcessingOptions::default(), &mut rng(3));
        assert!(!out.is_developed());
        assert_eq!(out.to_bytes(95).unwrap(), raw.to_vec());
    }
}
