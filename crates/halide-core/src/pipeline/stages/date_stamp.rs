use crate::blur::{Plane, box_blur, box_radius_for_sigma};
use crate::buffer::PixelBuffer;
use crate::color::{Rgba8, mix, to_u8};
use crate::font;
use crate::options::{DateStamp, DateStampFormat};
use crate::pipeline::stage::{Stage, StageContext};

/// Cap height as a fraction of image height.
const TEXT_HEIGHT: f32 = 0.04;
/// Right and bottom inset as a fraction of image height.
const MARGIN: f32 = 0.05;
const BLUR_PASSES: usize = 3;

struct Glow {
    color: Rgba8,
    /// Canvas-style shadow blur; the Gaussian sigma is half of it.
    blur: f32,
}

impl DateStampFormat {
    fn glow(self) -> Glow {
        match self {
            DateStampFormat::Classic => Glow {
                color: Rgba8::BLACK.with_alpha(0.5),
                blur: 2.0,
            },
            DateStampFormat::Digital => Glow {
                color: Rgba8::rgb(255, 100, 0).with_alpha(0.8),
                blur: 10.0,
            },
        }
    }
}

/// Imprints `'YY MM DD` bottom-right in the dot-matrix face.
pub struct DateStampStage;

impl Stage for DateStampStage {
    fn name(&self) -> &str {
        "date_stamp"
    }

    fn apply(&self, input: PixelBuffer, ctx: &mut StageContext<'_>) -> PixelBuffer {
        match ctx.options.active_date_stamp() {
            Some(stamp) => imprint(input, stamp),
            None => input,
        }
    }
}

pub fn imprint(mut buf: PixelBuffer, stamp: &DateStamp) -> PixelBuffer {
    let text = stamp.text();
    let (w, h) = (buf.width as f32, buf.height as f32);
    let dot = font::dot_size(h * TEXT_HEIGHT);
    let margin = h * MARGIN;
    let text_w = (font::columns(&text) * dot) as f32;
    let text_h = (font::GLYPH_ROWS * dot) as f32;

    let glow = stamp.format.glow();
    let radius = box_radius_for_sigma(glow.blur / 2.0, BLUR_PASSES);
    let pad = (radius * BLUR_PASSES + 1) as u32;

    let mask = font::rasterize(&text, dot, pad);
    let mut shadow = mask.clone();
    box_blur(&mut shadow, radius, BLUR_PASSES);

    // right-aligned, sitting on the bottom margin
    let left = (w - margin - text_w).round() as i64 - pad as i64;
    let top = (h - margin - text_h).round() as i64 - pad as i64;

    composite(&mut buf, &shadow, left, top, glow.color);
    composite(&mut buf, &mask, left, top, stamp.color);
    buf
}

/// Source-over `color` through `coverage`, placed at `(left, top)`.
fn composite(buf: &mut PixelBuffer, coverage: &Plane, left: i64, top: i64, color: Rgba8) {
    let alpha = color.alpha_f32();
    let rgb = [color.r as f32, color.g as f32, color.b as f32];
    for my in 0..coverage.height {
        let y = top + my as i64;
        if y < 0 || y >= buf.height as i64 {
            continue;
        }
        for mx in 0..coverage.width {
            let x = left + mx as i64;
            if x < 0 || x >= buf.width as i64 {
                continue;
            }
            let a = coverage.get(mx, my) * alpha;
            if a <= 0.0 {
                continue;
            }
            let i = (y as usize * buf.width as usize + x as usize) * 4;
            for c in 0..3 {
                buf.data[i + c] = to_u8(mix(buf.data[i + c] as f32, rgb[c], a));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ProcessingOptions;
    use crate::pipeline::stage::run_stage;
    use chrono::NaiveDate;

    fn stamp(format: DateStampFormat) -> DateStamp {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        DateStamp {
            format,
            color: Rgba8::rgb(255, 160, 0),
            ..DateStamp::new(ts)
        }
    }

    fn gray() -> PixelBuffer {
        PixelBuffer::filled(800, 600, Rgba8::rgb(120, 120, 120))
    }

    fn changed_bounds(a: &PixelBuffer, b: &PixelBuffer) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..a.height {
            for x in 0..a.width {
                if a.pixel(x, y) != b.pixel(x, y) {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        bounds
    }

    #[test]
    fn disabled_stamp_is_noop() {
        let mut s = stamp(DateStampFormat::Classic);
        s.enabled = false;
        let options = ProcessingOptions {
            date_stamp: Some(s),
            ..Default::default()
        };
        assert_eq!(run_stage(&DateStampStage, gray(), "none", &options, 0), gray());
    }

    #[test]
    fn classic_stamp_sits_bottom_right() {
        let out = imprint(gray(), &stamp(DateStampFormat::Classic));
        let (x0, y0, x1, y1) = changed_bounds(&gray(), &out).unwrap();
        // margin = 30px, text height = 24 * 7 / 7 = 21px (dot 3)
        assert!(x0 > 400, "x0 {x0}");
        assert!(y0 > 500, "y0 {y0}");
        assert!(x1 < 800 - 25, "x1 {x1}");
        assert!(y1 < 600 - 25, "y1 {y1}");
    }

    #[test]
    fn text_pixels_take_stamp_color() {
        let out = imprint(gray(), &stamp(DateStampFormat::Classic));
        let orange = (0..out.height)
            .flat_map(|y| (0..out.width).map(move |x| (x, y)))
            .filter(|&(x, y)| out.pixel(x, y) == [255, 160, 0, 255])
            .count();
        assert!(orange > 100, "{orange} fully inked pixels");
    }

    #[test]
    fn digital_glow_spreads_further() {
        let classic = imprint(gray(), &stamp(DateStampFormat::Classic));
        let digital = imprint(gray(), &stamp(DateStampFormat::Digital));
        let c = changed_bounds(&gray(), &classic).unwrap();
        let d = changed_bounds(&gray(), &digital).unwrap();
        assert!(d.0 < c.0 && d.1 < c.1);
    }

    #[test]
    fn tiny_image_does_not_panic() {
        let buf = PixelBuffer::filled(3, 2, Rgba8::WHITE);
        let out = imprint(buf, &stamp(DateStampFormat::Digital));
        assert_eq!((out.width, out.height), (3, 2));
    }
}
