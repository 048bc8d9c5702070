use std::sync::Arc;

use halide_core::PixelBuffer;
use halide_core::layout::{FrameRect, cover_fit};
use vello_cpu::kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Stroke};
use vello_cpu::peniko::color::PremulRgba8;
use vello_cpu::peniko::{Color, ImageSampler};
use vello_cpu::{Image, ImageSource, Pixmap, RenderContext};

use crate::annotation::{InkPath, TextAnnotation};
use crate::error::{SurfaceError, SurfaceResult};
use crate::text::FontBook;

/// Background photo uploaded once as a paint.
pub(crate) struct BackgroundPaint {
    pub image: Image,
    pub width: u32,
    pub height: u32,
}

impl BackgroundPaint {
    pub fn new(buf: &PixelBuffer) -> SurfaceResult<Self> {
        let (w, h) = canvas_dims(buf.width, buf.height)?;
        let pixels = buf
            .data
            .chunks_exact(4)
            .map(|px| {
                let [r, g, b, a] = premultiply(px[0], px[1], px[2], px[3]);
                PremulRgba8 { r, g, b, a }
            })
            .collect();
        let has_alpha = buf.data.chunks_exact(4).any(|px| px[3] != 255);
        let pixmap = Pixmap::from_parts_with_opacity(pixels, w, h, has_alpha);
        Ok(Self {
            image: Image {
                image: ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: ImageSampler::default(),
            },
            width: buf.width,
            height: buf.height,
        })
    }
}

/// Everything needed to draw one composite.
pub(crate) struct Scene<'a> {
    pub width: u32,
    pub height: u32,
    pub background: &'a BackgroundPaint,
    pub frame: FrameRect,
    pub inks: &'a [InkPath],
    pub open_ink: Option<&'a InkPath>,
    pub texts: &'a [TextAnnotation],
}

/// Validates a canvas size for the rasterizer.
pub(crate) fn canvas_dims(width: u32, height: u32) -> SurfaceResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::unavailable(format!(
            "canvas {width}x{height} has no area"
        )));
    }
    let w = u16::try_from(width)
        .map_err(|_| SurfaceError::unavailable(format!("canvas width {width} exceeds {}", u16::MAX)))?;
    let h = u16::try_from(height).map_err(|_| {
        SurfaceError::unavailable(format!("canvas height {height} exceeds {}", u16::MAX))
    })?;
    Ok((w, h))
}

/// White card, photo cover-fit into the frame, ink, then text.
pub(crate) fn render(scene: &Scene<'_>, fonts: &mut FontBook) -> SurfaceResult<PixelBuffer> {
    let (w, h) = canvas_dims(scene.width, scene.height)?;
    let mut ctx = RenderContext::new(w, h);

    ctx.set_paint(Color::from_rgba8(255, 255, 255, 255));
    ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

    let bg = scene.background;
    let place = cover_fit(bg.width, bg.height, &scene.frame);
    let frame = scene.frame;
    ctx.set_paint(bg.image.clone());
    ctx.set_paint_transform(Affine::translate((place.x, place.y)) * Affine::scale(place.scale));
    ctx.fill_rect(&Rect::new(frame.x, frame.y, frame.right(), frame.bottom()));
    ctx.set_paint_transform(Affine::IDENTITY);

    for ink in scene.inks.iter().chain(scene.open_ink) {
        stroke_ink(&mut ctx, ink);
    }
    for text in scene.texts {
        fonts.draw(&mut ctx, text);
    }

    ctx.flush();
    let mut pixmap = Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    let mut data = pixmap.data_as_u8_slice().to_vec();
    for px in data.chunks_exact_mut(4) {
        let [r, g, b, a] = unpremultiply(px[0], px[1], px[2], px[3]);
        px.copy_from_slice(&[r, g, b, a]);
    }
    PixelBuffer::from_data(scene.width, scene.height, data)
        .map_err(|e| SurfaceError::unavailable(e.to_string()))
}

fn stroke_ink(ctx: &mut RenderContext, ink: &InkPath) {
    if ink.points.is_empty() || ink.width.is_nan() || ink.width <= 0.0 {
        return;
    }
    let mut path = BezPath::new();
    for el in ink.to_bez_path().elements() {
        match *el {
            kurbo::PathEl::MoveTo(p) => path.move_to(Point::new(p.x, p.y)),
            kurbo::PathEl::LineTo(p) => path.line_to(Point::new(p.x, p.y)),
            _ => {}
        }
    }
    ctx.set_transform(Affine::IDENTITY);
    ctx.set_stroke(
        Stroke::new(ink.width)
            .with_caps(Cap::Round)
            .with_join(Join::Round),
    );
    ctx.set_paint(Color::from_rgba8(ink.color.r, ink.color.g, ink.color.b, ink.color.a));
    ctx.stroke_path(&path);
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let mul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
    [mul(r), mul(g), mul(b), a]
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    match a {
        0 => [0, 0, 0, 0],
        255 => [r, g, b, 255],
        _ => {
            let div = |c: u8| ((c as u16 * 255 + a as u16 / 2) / a as u16).min(255) as u8;
            [div(r), div(g), div(b), a]
        }
    }
}
