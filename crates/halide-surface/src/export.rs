use halide_core::PixelBuffer;
use halide_core::encode::{JPEG_QUALITY, encode_jpeg, encode_png};

use crate::error::{SurfaceError, SurfaceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg { quality: u8 },
    Png,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Jpeg {
            quality: JPEG_QUALITY,
        }
    }
}

impl ExportFormat {
    /// Picks a format from a file extension; JPEG for anything unknown.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => ExportFormat::Png,
            _ => ExportFormat::default(),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "jpg",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }

    pub fn encode(self, buf: &PixelBuffer) -> SurfaceResult<Vec<u8>> {
        let encoded = match self {
            ExportFormat::Jpeg { quality } => encode_jpeg(buf, quality),
            ExportFormat::Png => encode_png(buf),
        };
        encoded.map_err(|e| SurfaceError::encode(e.to_string()))
    }
}
