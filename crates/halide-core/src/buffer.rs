use image::RgbaImage;
use rayon::prelude::*;

use crate::color::Rgba8;
use crate::error::{PipelineError, PipelineResult};

/// RGBA8 pixel buffer.
///
/// Pixels are stored interleaved as RGBARGBA... with straight
/// (non-premultiplied) alpha, row-major from the top-left corner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Flat pixel data: [R, G, B, A, R, G, B, A, ...].
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Opaque black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba8::BLACK)
    }

    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        let px = [color.r, color.g, color.b, color.a];
        let data = px.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> PipelineResult<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::invalid_buffer(format!(
                "zero-sized buffer {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(PipelineError::invalid_buffer(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte length of one row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Mutable rows in parallel, with the row index.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = (usize, &mut [u8])> {
        let stride = self.stride();
        self.data.par_chunks_mut(stride).enumerate()
    }

    /// Average RGB of a rectangle, clipped to the buffer.
    pub fn mean_rgb(&self, x: u32, y: u32, w: u32, h: u32) -> [f32; 3] {
        let x1 = (x + w).min(self.width);
        let y1 = (y + h).min(self.height);
        let mut sum = [0.0f64; 3];
        let mut count = 0u64;
        for py in y..y1 {
            for px in x..x1 {
                let p = self.pixel(px, py);
                sum[0] += p[0] as f64;
                sum[1] += p[1] as f64;
                sum[2] += p[2] as f64;
                count += 1;
            }
        }
        if count == 0 {
            return [0.0; 3];
        }
        let n = count as f64;
        [
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
        ]
    }

    pub fn to_rgba_image(&self) -> PipelineResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| PipelineError::invalid_buffer("buffer does not match dimensions"))
    }

    pub fn into_rgba_image(self) -> PipelineResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| PipelineError::invalid_buffer("buffer does not match dimensions"))
    }

    pub fn from_rgba_image(img: RgbaImage) -> PipelineResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_data(width, height, img.into_raw())
    }
}
