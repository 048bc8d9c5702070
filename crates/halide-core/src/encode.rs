use std::io::Cursor;

use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType};

use crate::buffer::PixelBuffer;
use crate::error::{PipelineError, PipelineResult};

/// Quality used for every exported JPEG.
pub const JPEG_QUALITY: u8 = 95;

/// JPEG bytes. Alpha is dropped.
pub fn encode_jpeg(buf: &PixelBuffer, quality: u8) -> PipelineResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(buf.to_rgba_image()?).into_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| PipelineError::encode(e.to_string()))?;
    Ok(out.into_inner())
}

pub fn encode_png(buf: &PixelBuffer) -> PipelineResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(&buf.data, buf.width, buf.height, ExtendedColorType::Rgba8)
        .map_err(|e| PipelineError::encode(e.to_string()))?;
    Ok(out.into_inner())
}
