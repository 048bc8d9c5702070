use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::buffer::PixelBuffer;
use crate::color::to_u8;
use crate::error::{PipelineError, PipelineResult};

pub const RAW_EXTENSIONS: &[&str] = &[
    "cr2", "cr3", "crw", "nef", "nrw", "arw", "srf", "sr2", "raf", "rw2", "orf", "pef", "dng",
    "3fr", "erf", "iiq", "kdc", "mef", "mos", "mrw", "raw", "rwl", "srw", "x3f",
];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif"];

pub fn is_supported_extension(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    RAW_EXTENSIONS.contains(&lower.as_str()) || IMAGE_EXTENSIONS.contains(&lower.as_str())
}

pub fn is_raw_extension(ext: &str) -> bool {
    RAW_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Decode encoded image bytes (JPEG, PNG, TIFF) into an RGBA buffer.
pub fn decode_bytes(bytes: &[u8]) -> PipelineResult<PixelBuffer> {
    let t0 = std::time::Instant::now();
    let img = image::load_from_memory(bytes).map_err(|e| PipelineError::decode(e.to_string()))?;
    let rgba = img.into_rgba8();
    debug!(
        elapsed_ms = t0.elapsed().as_millis(),
        width = rgba.width(),
        height = rgba.height(),
        "image decode"
    );
    PixelBuffer::from_rgba_image(rgba).map_err(|e| PipelineError::decode(e.to_string()))
}

/// Develop a RAW file with rawler's default pipeline into display sRGB.
pub fn decode_raw(path: &Path) -> Result<PixelBuffer> {
    info!(?path, "decoding RAW file");
    let t0 = std::time::Instant::now();

    let raw_image = rawler::decode_file(path)
        .with_context(|| format!("failed to decode RAW: {}", path.display()))?;
    debug!(elapsed_ms = t0.elapsed().as_millis(), "rawler decode_file");

    let develop = rawler::imgop::develop::RawDevelop::default();
    let intermediate = develop
        .develop_intermediate(&raw_image)
        .with_context(|| format!("development failed: {}", path.display()))?;

    match intermediate {
        rawler::imgop::develop::Intermediate::ThreeColor(rgb) => {
            let mut data = Vec::with_capacity(rgb.data.len() * 4);
            for pixel in &rgb.data {
                data.extend_from_slice(&[
                    to_u8(pixel[0] * 255.0),
                    to_u8(pixel[1] * 255.0),
                    to_u8(pixel[2] * 255.0),
                    255,
                ]);
            }
            debug!(elapsed_ms = t0.elapsed().as_millis(), "total decode_raw");
            Ok(PixelBuffer::from_data(rgb.width as u32, rgb.height as u32, data)?)
        }
        _ => bail!("unexpected intermediate format (expected RGB)"),
    }
}

/// Load any supported file, RAW or standard.
pub fn load_path(path: &Path) -> Result<PixelBuffer> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if is_raw_extension(ext) {
        return decode_raw(path);
    }
    info!(?path, "loading image file");
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_bytes(&bytes).with_context(|| format!("failed to open image: {}", path.display()))
}
