use std::path::Path;
use std::time::Instant;

use anyhow::{Context as _, Result, bail};
use halide_core::decode;
use halide_core::session::DevelopSession;
use halide_core::{FilmPipeline, PixelBuffer, ProcessingOptions};
use halide_metadata::ExifData;
use halide_surface::{CompositingSurface, ExportFormat, TextStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::cli::DevelopArgs;
use crate::recipe::{self, Recipe, Resolved};

/// Gap between stacked text lines, in multiples of the font size.
const LINE_SPACING: f64 = 1.5;

pub async fn run(args: DevelopArgs) -> Result<()> {
    let t0 = Instant::now();
    let recipe = match &args.recipe {
        Some(path) => Recipe::load(path)?,
        None => Recipe::default(),
    };
    let capture_time = if args.date_stamp && args.stamp_date.is_none() {
        capture_time(&args.input)
    } else {
        None
    };
    let settings = recipe::resolve(&args, recipe, capture_time, &mut rand::rng())?;
    info!(
        input = %args.input.display(),
        filter = %settings.filter_id,
        layout = %settings.layout_id,
        seed = settings.seed,
        "developing"
    );

    let session = DevelopSession::new(FilmPipeline::new());
    let developed = develop_file(&session, &args.input, &settings).await?;

    let mut surface = CompositingSurface::new(developed, &settings.layout_id)?;
    for path in &args.fonts {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font {}", path.display()))?;
        let family = surface
            .register_font(None, bytes)
            .with_context(|| format!("register font {}", path.display()))?;
        debug!(%family, path = %path.display(), "font loaded");
    }
    if !settings.annotations.is_empty() {
        surface.restore(settings.annotations.clone())?;
    }
    add_texts(&mut surface, &args)?;

    let format = export_format(&args.output, args.quality);
    let bytes = surface.export(format)?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("write {}", args.output.display()))?;
    info!(
        output = %args.output.display(),
        width = surface.width(),
        height = surface.height(),
        bytes = bytes.len(),
        elapsed_ms = t0.elapsed().as_millis(),
        "print exported"
    );
    Ok(())
}

async fn develop_file(
    session: &DevelopSession,
    path: &Path,
    settings: &Resolved,
) -> Result<PixelBuffer> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if decode::is_raw_extension(ext) {
        // RAW needs the path for the container parser.
        let path = path.to_path_buf();
        let session = session.clone();
        let (filter_id, options, seed) = (
            settings.filter_id.clone(),
            settings.options.clone(),
            settings.seed,
        );
        return tokio::task::spawn_blocking(move || {
            develop_raw(session.pipeline(), &path, &filter_id, &options, seed)
        })
        .await
        .context("develop task failed")?;
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let developed = session
        .develop(
            bytes,
            settings.filter_id.clone(),
            settings.options.clone(),
            settings.seed,
        )
        .await
        .with_context(|| format!("develop {}", path.display()))?;
    match developed.fresh() {
        Some(buf) => Ok(buf),
        None => bail!("develop of {} was superseded", path.display()),
    }
}

fn develop_raw(
    pipeline: &FilmPipeline,
    path: &Path,
    filter_id: &str,
    options: &ProcessingOptions,
    seed: u64,
) -> Result<PixelBuffer> {
    let buf = decode::load_path(path)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(pipeline.develop(buf, filter_id, options, &mut rng))
}

fn capture_time(path: &Path) -> Option<chrono::NaiveDateTime> {
    match ExifData::from_file(path) {
        Ok(exif) => exif.capture_time(),
        Err(e) => {
            debug!(error = %e, "no EXIF capture time");
            None
        }
    }
}

/// Text lines stack downward from the canvas center.
fn add_texts(surface: &mut CompositingSurface, args: &DevelopArgs) -> Result<()> {
    let mut style = TextStyle::default();
    if let Some(size) = args.text_size {
        style.font_size = size;
    }
    if let Some(color) = args.text_color {
        style.color = color;
    }
    if let Some(family) = &args.font_family {
        style.font_family = family.clone();
    }
    let step = style.font_size as f64 * LINE_SPACING;
    for (i, text) in args.texts.iter().enumerate() {
        let index = surface.add_text(text, style.clone())?;
        if i > 0 {
            let (x, y) = (surface.width() as f64 / 2.0, surface.height() as f64 / 2.0);
            if !surface.move_text(index, x, y + step * i as f64)? {
                warn!(index, "text annotation vanished before it could be placed");
            }
        }
    }
    Ok(())
}

fn export_format(output: &Path, quality: Option<u8>) -> ExportFormat {
    let ext = output.extension().and_then(|e| e.to_str()).unwrap_or("");
    match (ExportFormat::from_extension(ext), quality) {
        (ExportFormat::Jpeg { .. }, Some(quality)) => ExportFormat::Jpeg { quality },
        (format, _) => format,
    }
}
