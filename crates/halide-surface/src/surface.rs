use halide_core::layout::{self, FrameRect, LayoutSpec};
use halide_core::{PixelBuffer, Rgba8};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::annotation::{
    AnnotationSnapshot, DEFAULT_FONT_SIZE, InkPath, PLACEHOLDER_FONT_FAMILY, PLACEHOLDER_TEXT,
    TextAnnotation, TextStyle,
};
use crate::error::SurfaceResult;
use crate::export::ExportFormat;
use crate::input::{PointerEvent, Presentation, ToolMode};
use crate::raster::{self, BackgroundPaint, Scene};
use crate::text::FontBook;

pub const DEFAULT_STROKE_WIDTH: f64 = 5.0;

/// A framed print the user can draw and type on.
///
/// Annotation geometry is stored in canvas pixels. The background is the
/// developed photo (date stamp included), cover-fit into the layout frame.
pub struct CompositingSurface {
    background: PixelBuffer,
    paint: BackgroundPaint,
    layout: &'static LayoutSpec,
    width: u32,
    height: u32,
    /// Set by [`CompositingSurface::with_size`]. A pinned canvas keeps its
    /// width across layout changes instead of taking the layout's size.
    pinned: bool,
    frame: FrameRect,
    annotations: AnnotationSnapshot,
    open_ink: Option<InkPath>,
    tool: ToolMode,
    color: Rgba8,
    stroke_width: f64,
    fonts: Mutex<FontBook>,
    /// Latest composite, refreshed after every visible change.
    composite: PixelBuffer,
    renders: u64,
}

impl CompositingSurface {
    /// A surface at the layout's native print size.
    pub fn new(background: PixelBuffer, layout_id: &str) -> SurfaceResult<Self> {
        let print_layout = layout::lookup(layout_id);
        Self::build(background, layout_id, print_layout.width, print_layout.height, false)
    }

    /// A surface pinned to `width` x `height`.
    pub fn with_size(
        background: PixelBuffer,
        layout_id: &str,
        width: u32,
        height: u32,
    ) -> SurfaceResult<Self> {
        Self::build(background, layout_id, width, height, true)
    }

    fn build(
        background: PixelBuffer,
        layout_id: &str,
        width: u32,
        height: u32,
        pinned: bool,
    ) -> SurfaceResult<Self> {
        raster::canvas_dims(width, height)?;
        let paint = BackgroundPaint::new(&background)?;
        let print_layout = layout::lookup(layout_id);
        let mut surface = Self {
            background,
            paint,
            layout: print_layout,
            width,
            height,
            pinned,
            frame: layout::frame_for_policy(print_layout.margin, width, height),
            annotations: AnnotationSnapshot::default(),
            open_ink: None,
            tool: ToolMode::Idle,
            color: Rgba8::BLACK,
            stroke_width: DEFAULT_STROKE_WIDTH,
            fonts: Mutex::new(FontBook::new()),
            composite: PixelBuffer::new(width, height),
            renders: 0,
        };
        surface.refresh()?;
        info!(layout = print_layout.id, width, height, "surface ready");
        Ok(surface)
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> &'static LayoutSpec {
        self.layout
    }

    pub fn frame(&self) -> FrameRect {
        self.frame
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn background(&self) -> &PixelBuffer {
        &self.background
    }

    pub fn text_annotations(&self) -> &[TextAnnotation] {
        &self.annotations.text_annotations
    }

    pub fn ink_paths(&self) -> &[InkPath] {
        &self.annotations.ink_paths
    }

    /// The stroke currently being drawn, if any.
    pub fn open_ink(&self) -> Option<&InkPath> {
        self.open_ink.as_ref()
    }

    /// The most recent composite.
    pub fn composite(&self) -> &PixelBuffer {
        &self.composite
    }

    /// How many times the composite has been redrawn.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    // ── Tools ──────────────────────────────────────────────────────

    /// Switch tools. Leaving Drawing commits any open stroke; entering
    /// TextEditing drops a placeholder at the canvas center.
    pub fn set_tool(&mut self, mode: ToolMode) -> SurfaceResult<()> {
        let prev = self.tool;
        if prev == mode {
            return Ok(());
        }
        debug!(?prev, ?mode, "tool change");
        self.tool = mode;
        if prev == ToolMode::Drawing {
            self.commit_ink()?;
        }
        if mode == ToolMode::TextEditing {
            let style = TextStyle {
                font_size: DEFAULT_FONT_SIZE,
                color: self.color,
                font_family: PLACEHOLDER_FONT_FAMILY.into(),
            };
            self.add_text(PLACEHOLDER_TEXT, style)?;
        }
        Ok(())
    }

    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    /// Brush width in presentation pixels; scaled to canvas pixels per stroke.
    pub fn set_stroke_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.stroke_width = width;
        }
    }

    // ── Pointer input ──────────────────────────────────────────────

    pub fn pointer_down(&mut self, event: PointerEvent, pres: Presentation) -> SurfaceResult<()> {
        if self.tool != ToolMode::Drawing {
            return Ok(());
        }
        // a lost pointer-up must not merge two strokes
        if self.open_ink.is_some() {
            self.commit_ink()?;
        }
        let (sx, _) = pres.scale_to(self.width, self.height);
        let start = pres.to_canvas(event, self.width, self.height);
        self.open_ink = Some(InkPath::new(start, self.color, self.stroke_width * sx));
        Ok(())
    }

    pub fn pointer_move(&mut self, event: PointerEvent, pres: Presentation) -> SurfaceResult<()> {
        if self.tool != ToolMode::Drawing {
            return Ok(());
        }
        let point = pres.to_canvas(event, self.width, self.height);
        match self.open_ink.as_mut() {
            Some(ink) => ink.points.push(point),
            None => return Ok(()),
        }
        self.refresh()
    }

    pub fn pointer_up(&mut self, _event: PointerEvent, _pres: Presentation) -> SurfaceResult<()> {
        self.commit_ink()
    }

    fn commit_ink(&mut self) -> SurfaceResult<()> {
        let Some(ink) = self.open_ink.take() else {
            return Ok(());
        };
        debug!(points = ink.points.len(), width = ink.width, "stroke committed");
        self.annotations.ink_paths.push(ink);
        self.refresh()
    }

    // ── Text ───────────────────────────────────────────────────────

    /// Adds a text annotation starting at the canvas center. Returns its index.
    pub fn add_text(&mut self, text: &str, style: TextStyle) -> SurfaceResult<usize> {
        if !self.fonts.lock().resolves(&style.font_family) {
            warn!(family = %style.font_family, "font not registered, text will use the dot-matrix face");
        }
        self.annotations.text_annotations.push(TextAnnotation {
            text: text.to_string(),
            x: self.width as f64 / 2.0,
            y: self.height as f64 / 2.0,
            font_size: style.font_size,
            color: style.color,
            font_family: style.font_family,
        });
        self.refresh()?;
        Ok(self.annotations.text_annotations.len() - 1)
    }

    /// Replaces the text of an existing annotation. Returns false for a bad index.
    pub fn edit_text(&mut self, index: usize, text: &str) -> SurfaceResult<bool> {
        let Some(annotation) = self.annotations.text_annotations.get_mut(index) else {
            return Ok(false);
        };
        annotation.text = text.to_string();
        self.refresh()?;
        Ok(true)
    }

    pub fn move_text(&mut self, index: usize, x: f64, y: f64) -> SurfaceResult<bool> {
        let Some(annotation) = self.annotations.text_annotations.get_mut(index) else {
            return Ok(false);
        };
        annotation.x = x;
        annotation.y = y;
        self.refresh()?;
        Ok(true)
    }

    /// Registers a font file for text annotations, optionally under an alias.
    pub fn register_font(&mut self, alias: Option<&str>, bytes: Vec<u8>) -> SurfaceResult<String> {
        let family = self.fonts.lock().register(alias, bytes)?;
        self.refresh()?;
        Ok(family)
    }

    /// Turns system font lookup on or off. Off, only registered fonts
    /// shape text and everything else draws in the dot-matrix face.
    pub fn set_system_fonts(&mut self, enabled: bool) -> SurfaceResult<()> {
        self.fonts.get_mut().set_system_fonts(enabled)?;
        self.refresh()
    }

    // ── State ──────────────────────────────────────────────────────

    /// Re-frames the print at the layout's native size, or at the pinned
    /// width with the layout's aspect. Annotations stay put.
    pub fn set_layout(&mut self, layout_id: &str) -> SurfaceResult<()> {
        let print_layout = layout::lookup(layout_id);
        let (width, height) = if self.pinned {
            let aspect = print_layout.height as f64 / print_layout.width as f64;
            (self.width, ((self.width as f64 * aspect).round() as u32).max(1))
        } else {
            (print_layout.width, print_layout.height)
        };
        raster::canvas_dims(width, height)?;
        self.layout = print_layout;
        self.width = width;
        self.height = height;
        self.frame = layout::frame_for_policy(print_layout.margin, width, height);
        debug!(layout = print_layout.id, width, height, pinned = self.pinned, "layout changed");
        self.refresh()
    }

    pub fn clear(&mut self) -> SurfaceResult<()> {
        self.annotations = AnnotationSnapshot::default();
        self.open_ink = None;
        self.refresh()
    }

    /// Committed annotations. An open stroke is not included.
    pub fn snapshot(&self) -> AnnotationSnapshot {
        self.annotations.clone()
    }

    pub fn restore(&mut self, snapshot: AnnotationSnapshot) -> SurfaceResult<()> {
        self.annotations = snapshot;
        self.refresh()
    }

    /// Swaps in a re-developed photo, keeping every annotation.
    pub fn replace_background(&mut self, background: PixelBuffer) -> SurfaceResult<()> {
        self.commit_ink()?;
        let saved = self.snapshot();
        let paint = BackgroundPaint::new(&background)?;
        self.background = background;
        self.paint = paint;
        info!(
            width = self.background.width,
            height = self.background.height,
            texts = saved.text_annotations.len(),
            inks = saved.ink_paths.len(),
            "background replaced"
        );
        self.restore(saved)
    }

    // ── Output ─────────────────────────────────────────────────────

    fn scene(&self) -> Scene<'_> {
        Scene {
            width: self.width,
            height: self.height,
            background: &self.paint,
            frame: self.frame,
            inks: &self.annotations.ink_paths,
            open_ink: self.open_ink.as_ref(),
            texts: &self.annotations.text_annotations,
        }
    }

    fn refresh(&mut self) -> SurfaceResult<()> {
        let t0 = std::time::Instant::now();
        let composite = raster::render(&self.scene(), &mut self.fonts.lock())?;
        self.composite = composite;
        self.renders += 1;
        debug!(elapsed_ms = t0.elapsed().as_millis(), "surface rendered");
        Ok(())
    }

    /// Full composite at canvas resolution.
    pub fn flatten(&self) -> SurfaceResult<PixelBuffer> {
        raster::render(&self.scene(), &mut self.fonts.lock())
    }

    pub fn export(&self, format: ExportFormat) -> SurfaceResult<Vec<u8>> {
        let t0 = std::time::Instant::now();
        let bytes = format.encode(&self.flatten()?)?;
        info!(
            ?format,
            bytes = bytes.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "exported"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use halide_core::decode::decode_bytes;

    const RED: Rgba8 = Rgba8::rgb(220, 30, 30);

    fn photo() -> PixelBuffer {
        PixelBuffer::filled(300, 200, RED)
    }

    /// Fixed-size surface that ignores host fonts.
    fn small(layout_id: &str) -> CompositingSurface {
        let mut surface = CompositingSurface::with_size(photo(), layout_id, 200, 250).unwrap();
        surface.set_system_fonts(false).unwrap();
        surface
    }

    /// Image sampling may be off by a unit; solid fills are exact.
    fn assert_near(px: [u8; 4], expected: Rgba8) {
        let want = [expected.r, expected.g, expected.b, expected.a];
        for c in 0..4 {
            assert!((px[c] as i32 - want[c] as i32).abs() <= 2, "{px:?} vs {want:?}");
        }
    }

    fn native(surface: &CompositingSurface) -> Presentation {
        Presentation::native(surface.width(), surface.height())
    }

    fn stroke(surface: &mut CompositingSurface, pres: Presentation, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        surface.pointer_down(PointerEvent::new(first.0, first.1), pres).unwrap();
        for &(x, y) in rest {
            surface.pointer_move(PointerEvent::new(x, y), pres).unwrap();
        }
        let last = points.last().unwrap();
        surface.pointer_up(PointerEvent::new(last.0, last.1), pres).unwrap();
    }

    #[test]
    fn native_size_follows_layout() {
        let surface = CompositingSurface::new(photo(), "polaroid").unwrap();
        assert_eq!((surface.width(), surface.height()), (1080, 1350));
        let frame = surface.frame();
        assert!(1350.0 - frame.bottom() > frame.y);
    }

    #[test]
    fn zero_canvas_is_unavailable() {
        let err = CompositingSurface::with_size(photo(), "1:1", 0, 100).err().unwrap();
        assert!(matches!(err, SurfaceError::Unavailable(_)));
    }

    #[test]
    fn background_fills_frame_on_white_card() {
        let surface = small("4:5");
        let out = surface.flatten().unwrap();
        assert_eq!(out.pixel(1, 1), [255, 255, 255, 255]);
        assert_near(out.pixel(100, 125), RED);
        // border is 4% of 200 = 8px
        assert_eq!(out.pixel(199, 125), [255, 255, 255, 255]);
        assert_near(out.pixel(12, 125), RED);
    }

    #[test]
    fn n_moves_make_n_plus_one_points() {
        let mut surface = small("4:5");
        surface.set_tool(ToolMode::Drawing).unwrap();
        let pres = native(&surface);
        let before = surface.render_count();
        stroke(&mut surface, pres, &[(10.0, 10.0), (20.0, 10.0), (30.0, 12.0), (40.0, 15.0)]);
        let inks = surface.ink_paths();
        assert_eq!(inks.len(), 1);
        assert_eq!(inks[0].points.len(), 4);
        // three moves plus the commit
        assert_eq!(surface.render_count() - before, 4);
        assert!(surface.open_ink().is_none());
    }

    #[test]
    fn pointer_ignored_outside_drawing() {
        let mut surface = small("4:5");
        let pres = native(&surface);
        stroke(&mut surface, pres, &[(10.0, 10.0), (20.0, 20.0)]);
        assert!(surface.ink_paths().is_empty());
    }

    #[test]
    fn presentation_scaling_applies_to_points_and_width() {
        let mut surface = small("4:5");
        surface.set_tool(ToolMode::Drawing).unwrap();
        surface.set_stroke_width(5.0);
        let pres = Presentation::new(100.0, 125.0);
        stroke(&mut surface, pres, &[(10.0, 20.0), (30.0, 40.0)]);
        let ink = &surface.ink_paths()[0];
        assert_eq!(ink.points[0], kurbo::Point::new(20.0, 40.0));
        assert_eq!(ink.points[1], kurbo::Point::new(60.0, 80.0));
        assert_eq!(ink.width, 10.0);
    }

    #[test]
    fn leaving_drawing_commits_open_stroke() {
        let mut surface = small("4:5");
        surface.set_tool(ToolMode::Drawing).unwrap();
        let pres = native(&surface);
        surface.pointer_down(PointerEvent::new(5.0, 5.0), pres).unwrap();
        surface.pointer_move(PointerEvent::new(50.0, 50.0), pres).unwrap();
        assert!(surface.ink_paths().is_empty());
        surface.set_tool(ToolMode::Idle).unwrap();
        assert_eq!(surface.ink_paths().len(), 1);
        assert_eq!(surface.ink_paths()[0].points.len(), 2);
    }

    #[test]
    fn ink_is_drawn_over_background() {
        let mut surface = small("4:5");
        surface.set_tool(ToolMode::Drawing).unwrap();
        surface.set_color(Rgba8::rgb(0, 0, 255));
        surface.set_stroke_width(10.0);
        let pres = native(&surface);
        stroke(&mut surface, pres, &[(40.0, 100.0), (160.0, 100.0)]);
        let out = surface.flatten().unwrap();
        assert_eq!(out.pixel(100, 100), [0, 0, 255, 255]);
        assert_near(out.pixel(100, 140), RED);
    }

    #[test]
    fn open_stroke_is_visible_while_drawing() {
        let mut surface = small("4:5");
        surface.set_tool(ToolMode::Drawing).unwrap();
        surface.set_color(Rgba8::rgb(0, 0, 255));
        surface.set_stroke_width(10.0);
        let pres = native(&surface);
        surface.pointer_down(PointerEvent::new(40.0, 60.0), pres).unwrap();
        surface.pointer_move(PointerEvent::new(160.0, 60.0), pres).unwrap();
        assert_eq!(surface.composite().pixel(100, 60), [0, 0, 255, 255]);
    }

    #[test]
    fn text_tool_inserts_placeholder_at_center() {
        let mut surface = small("4:5");
        surface.set_color(Rgba8::WHITE);
        surface.set_tool(ToolMode::TextEditing).unwrap();
        let texts = surface.text_annotations();
        assert_eq!(texts.len(), 1);
        let t = &texts[0];
        assert_eq!(t.text, "Type here...");
        assert_eq!(t.font_size, 40.0);
        assert_eq!(t.font_family, "Courier New");
        assert_eq!(t.color, Rgba8::WHITE);
        assert_eq!((t.x, t.y), (100.0, 125.0));

        // staying in the text tool does not add another
        surface.set_tool(ToolMode::TextEditing).unwrap();
        assert_eq!(surface.text_annotations().len(), 1);
        surface.set_tool(ToolMode::Idle).unwrap();
        surface.set_tool(ToolMode::TextEditing).unwrap();
        assert_eq!(surface.text_annotations().len(), 2);
    }

    #[test]
    fn fallback_text_is_rendered() {
        let mut surface = small("4:5");
        let style = TextStyle {
            font_size: 20.0,
            color: Rgba8::BLACK,
            ..Default::default()
        };
        surface.add_text("HI", style).unwrap();
        let out = surface.flatten().unwrap();
        // 'H' left stem: 2px dots, 14px tall, sitting on the baseline at y=125
        assert_eq!(out.pixel(101, 120), [0, 0, 0, 255]);
        assert_near(out.pixel(101, 130), RED);
    }

    fn flatten_text(surface: &mut CompositingSurface, text: &str) -> PixelBuffer {
        surface.clear().unwrap();
        let style = TextStyle {
            font_size: 30.0,
            color: Rgba8::BLACK,
            ..Default::default()
        };
        let i = surface.add_text(text, style).unwrap();
        surface.move_text(i, 20.0, 125.0).unwrap();
        surface.flatten().unwrap()
    }

    #[test]
    fn accents_and_case_survive_fallback() {
        let mut surface = small("4:5");
        let mixed = flatten_text(&mut surface, "Café ok");
        let shouted = flatten_text(&mut surface, "CAF? OK");
        assert_ne!(mixed.data, shouted.data);
        let plain = flatten_text(&mut surface, "Cafe ok");
        assert_ne!(mixed.data, plain.data);
    }

    #[test]
    fn accents_and_case_survive_system_fonts() {
        let mut surface = small("4:5");
        surface.set_system_fonts(true).unwrap();
        let mixed = flatten_text(&mut surface, "Café ok");
        let shouted = flatten_text(&mut surface, "CAF? OK");
        assert_ne!(mixed.data, shouted.data);
    }

    #[test]
    fn edit_and_move_text() {
        let mut surface = small("4:5");
        let i = surface.add_text("draft", TextStyle::default()).unwrap();
        assert!(surface.edit_text(i, "final").unwrap());
        assert!(surface.move_text(i, 10.0, 30.0).unwrap());
        assert!(!surface.edit_text(9, "nope").unwrap());
        let t = &surface.text_annotations()[i];
        assert_eq!((t.text.as_str(), t.x, t.y), ("final", 10.0, 30.0));
    }

    #[test]
    fn background_swap_keeps_annotations() {
        let mut surface = small("polaroid");
        surface.set_tool(ToolMode::Drawing).unwrap();
        let pres = native(&surface);
        stroke(&mut surface, pres, &[(10.0, 10.0), (90.0, 90.0)]);
        surface.set_tool(ToolMode::TextEditing).unwrap();
        let before = surface.snapshot();

        surface
            .replace_background(PixelBuffer::filled(64, 64, Rgba8::rgb(0, 200, 0)))
            .unwrap();
        assert_eq!(surface.snapshot(), before);
        let out = surface.flatten().unwrap();
        assert_near(out.pixel(150, 150), Rgba8::rgb(0, 200, 0));
    }

    #[test]
    fn restore_replaces_annotations() {
        let mut surface = small("1:1");
        surface.add_text("one", TextStyle::default()).unwrap();
        let snap = surface.snapshot();
        surface.clear().unwrap();
        assert!(surface.snapshot().is_empty());
        surface.restore(snap.clone()).unwrap();
        assert_eq!(surface.snapshot(), snap);
    }

    #[test]
    fn layout_change_reframes_without_dropping() {
        let mut surface = small("4:5");
        surface.add_text("keep", TextStyle::default()).unwrap();
        surface.set_layout("1:1").unwrap();
        assert_eq!((surface.width(), surface.height()), (200, 200));
        assert_eq!(surface.layout().id, "1:1");
        assert_eq!(surface.text_annotations().len(), 1);
        assert_eq!(surface.composite().height, 200);
    }

    #[test]
    fn layout_change_takes_native_size() {
        let mut surface = CompositingSurface::new(photo(), "1:1").unwrap();
        surface.set_system_fonts(false).unwrap();
        surface.add_text("keep", TextStyle::default()).unwrap();
        for id in ["polaroid", "1:1", "4:5"] {
            surface.set_layout(id).unwrap();
            let l = layout::lookup(id);
            assert_eq!((surface.width(), surface.height()), (l.width, l.height), "{id}");
            assert_eq!(
                (surface.composite().width, surface.composite().height),
                (l.width, l.height)
            );
        }
        assert_eq!(surface.text_annotations().len(), 1);
    }

    #[test]
    fn exports_decodable_images() {
        let surface = small("4:5");
        for format in [ExportFormat::default(), ExportFormat::Png] {
            let bytes = surface.export(format).unwrap();
            let back = decode_bytes(&bytes).unwrap();
            assert_eq!((back.width, back.height), (200, 250));
        }
    }
}
