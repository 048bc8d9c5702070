use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use tracing::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::pipeline::stage::{Stage, StageContext};

/// Long-edge ceiling for developed prints.
pub const MAX_EDGE: u32 = 3840;

/// Dimensions after fitting inside `max_edge`, flooring like the canvas host.
pub fn bounded_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width.max(height) <= max_edge {
        return (width, height);
    }
    // floor(dim * min(max/w, max/h)) in exact integer arithmetic
    let (w, h, m) = (width as u64, height as u64, max_edge as u64);
    if width >= height {
        (max_edge, ((h * m) / w).max(1) as u32)
    } else {
        (((w * m) / h).max(1) as u32, max_edge)
    }
}

pub struct Resize;

impl Stage for Resize {
    fn name(&self) -> &str {
        "resize"
    }

    fn apply(&self, input: PixelBuffer, _ctx: &mut StageContext<'_>) -> PixelBuffer {
        let (w, h) = bounded_size(input.width, input.height, MAX_EDGE);
        if (w, h) == (input.width, input.height) {
            return input;
        }
        let Some(view) =
            ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(input.width, input.height, &input.data[..])
        else {
            warn!("buffer does not match its dimensions, skipping resize");
            return input;
        };
        let resized = imageops::resize(&view, w, h, FilterType::Triangle);
        debug!(
            from = ?(input.width, input.height),
            to = ?(w, h),
            "downscaled"
        );
        PixelBuffer {
            width: w,
            height: h,
            data: resized.into_raw(),
        }
    }
}
