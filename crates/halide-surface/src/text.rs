//! Text shaping and drawing.
//!
//! Text is shaped with parley against the registered font files and, unless
//! the book is isolated, the fonts installed on the system. A family that is
//! not found falls through a generic stack, with per-character fallback
//! picking up accents and other scripts. Only when shaping yields no glyphs
//! at all is the built-in dot-matrix face drawn, so annotation text always
//! shows up in the export.

use std::borrow::Cow;
use std::collections::HashMap;

use halide_core::font;
use parley::fontique::{Blob, Collection, CollectionOptions, SourceCache};
use parley::layout::PositionedLayoutItem;
use parley::style::{FontStack, StyleProperty};
use tracing::{debug, info};
use vello_cpu::RenderContext;
use vello_cpu::kurbo::{Affine, Rect};
use vello_cpu::peniko::Color;

use crate::annotation::TextAnnotation;
use crate::error::{SurfaceError, SurfaceResult};

/// Dot pitch of the fallback face as a fraction of font size. Gives a
/// 0.7 em cap height and a 0.6 em monospace advance.
const DOT_EM: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// A font file handed to [`FontBook::register`], kept so the collection can
/// be rebuilt when system discovery is toggled.
struct Source {
    alias: Option<String>,
    blob: Blob<u8>,
}

pub struct FontBook {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    /// Lowercased family name or alias to the registered family name.
    families: HashMap<String, String>,
    sources: Vec<Source>,
    system_fonts: bool,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    /// A book that also resolves families against installed system fonts.
    pub fn new() -> Self {
        Self::with_system_fonts(true)
    }

    /// A book that only knows registered font files. Rendering does not
    /// depend on the host's fonts.
    pub fn isolated() -> Self {
        Self::with_system_fonts(false)
    }

    fn with_system_fonts(system_fonts: bool) -> Self {
        Self {
            font_ctx: font_context(system_fonts),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
            sources: Vec::new(),
            system_fonts,
        }
    }

    pub fn system_fonts(&self) -> bool {
        self.system_fonts
    }

    /// Switches system font discovery on or off, keeping registered fonts.
    pub fn set_system_fonts(&mut self, enabled: bool) -> SurfaceResult<()> {
        if enabled == self.system_fonts {
            return Ok(());
        }
        self.font_ctx = font_context(enabled);
        self.families.clear();
        self.system_fonts = enabled;
        for source in std::mem::take(&mut self.sources) {
            self.register_blob(source.alias.as_deref(), source.blob)?;
        }
        debug!(enabled, fonts = self.sources.len(), "system fonts toggled");
        Ok(())
    }

    /// Registers a font file under its own family name and, optionally,
    /// an alias such as `"Courier New"`. Returns the font's family name.
    pub fn register(&mut self, alias: Option<&str>, bytes: Vec<u8>) -> SurfaceResult<String> {
        let family = self.register_blob(alias, Blob::from(bytes))?;
        info!(family = %family, alias = ?alias, "registered font");
        Ok(family)
    }

    fn register_blob(&mut self, alias: Option<&str>, blob: Blob<u8>) -> SurfaceResult<String> {
        let families = self.font_ctx.collection.register_fonts(blob.clone(), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| SurfaceError::font("no font families found in font data"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SurfaceError::font("registered font family has no name"))?
            .to_string();
        for key in std::iter::once(family.as_str()).chain(alias) {
            self.families.insert(key.to_lowercase(), family.clone());
        }
        self.sources.push(Source {
            alias: alias.map(str::to_string),
            blob,
        });
        Ok(family)
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(&family.to_lowercase())
    }

    /// Whether text in `family` is shaped rather than drawn dot-matrix.
    pub fn resolves(&self, family: &str) -> bool {
        self.system_fonts || self.has_family(family)
    }

    pub(crate) fn draw(&mut self, ctx: &mut RenderContext, text: &TextAnnotation) {
        if text.text.is_empty() || text.font_size.is_nan() || text.font_size <= 0.0 {
            return;
        }
        let color = Color::from_rgba8(text.color.r, text.color.g, text.color.b, text.color.a);
        let stack = match self.families.get(&text.font_family.to_lowercase()) {
            Some(family) => quote_family(family),
            None if self.system_fonts => {
                format!("{}, {}", quote_family(&text.font_family), generic_for(&text.font_family))
            }
            None => {
                debug!(family = %text.font_family, "font not registered, using dot-matrix face");
                draw_dot_matrix(ctx, text, color);
                return;
            }
        };
        if !self.draw_shaped(ctx, text, stack, color) {
            debug!(family = %text.font_family, "no glyphs shaped, using dot-matrix face");
            draw_dot_matrix(ctx, text, color);
        }
    }

    /// Shapes and fills `text`. Returns false when no font produced glyphs.
    fn draw_shaped(
        &mut self,
        ctx: &mut RenderContext,
        text: &TextAnnotation,
        stack: String,
        color: Color,
    ) -> bool {
        let brush = TextBrush {
            r: text.color.r,
            g: text.color.g,
            b: text.color.b,
            a: text.color.a,
        };
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text.text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Owned(stack))));
        builder.push_default(StyleProperty::FontSize(text.font_size));
        builder.push_default(StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrush> = builder.build(&text.text);
        layout.break_all_lines(None);

        let shaped = layout.lines().any(|line| {
            line.items().any(|item| match item {
                PositionedLayoutItem::GlyphRun(run) => run.glyphs().any(|g| g.id != 0),
                PositionedLayoutItem::InlineBox(_) => false,
            })
        });
        if !shaped {
            return false;
        }

        // (x, y) is where the first baseline starts
        let first_baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline as f64)
            .unwrap_or(0.0);
        ctx.set_transform(Affine::translate((text.x, text.y - first_baseline)));
        ctx.set_paint(color);
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(run.run().font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(Affine::IDENTITY);
        true
    }
}

fn font_context(system_fonts: bool) -> parley::FontContext {
    parley::FontContext {
        collection: Collection::new(CollectionOptions {
            system_fonts,
            ..Default::default()
        }),
        source_cache: SourceCache::default(),
    }
}

fn quote_family(family: &str) -> String {
    format!("\"{}\"", family.replace('"', ""))
}

/// Generic family to try after a named one the system may lack.
fn generic_for(family: &str) -> &'static str {
    let family = family.to_lowercase();
    if ["courier", "mono", "typewriter", "consol"]
        .iter()
        .any(|hint| family.contains(hint))
    {
        "monospace"
    } else if ["times", "georgia", "garamond", "serif"]
        .iter()
        .any(|hint| family.contains(hint) && !family.contains("sans"))
    {
        "serif"
    } else {
        "sans-serif"
    }
}

/// Dot-matrix text with its bottom row on the baseline at `(x, y)`.
fn draw_dot_matrix(ctx: &mut RenderContext, text: &TextAnnotation, color: Color) {
    let dot = text.font_size as f64 * DOT_EM;
    let top = text.y - font::GLYPH_ROWS as f64 * dot;
    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(color);
    font::for_each_dot(&text.text, |col, row| {
        let x0 = text.x + col as f64 * dot;
        let y0 = top + row as f64 * dot;
        ctx.fill_rect(&Rect::new(x0, y0, x0 + dot, y0 + dot));
    });
}

/// Width and cap height of `text` in the fallback face.
pub fn dot_matrix_extent(text: &str, font_size: f32) -> (f64, f64) {
    let dot = font_size as f64 * DOT_EM;
    (
        font::columns(text) as f64 * dot,
        font::GLYPH_ROWS as f64 * dot,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_font_is_rejected() {
        let mut book = FontBook::isolated();
        let err = book.register(Some("Courier New"), b"not a font".to_vec()).unwrap_err();
        assert!(matches!(err, SurfaceError::Font(_)));
        assert!(!book.has_family("Courier New"));
    }

    #[test]
    fn fallback_extent_is_monospace() {
        let (w, h) = dot_matrix_extent("Type here...", 40.0);
        // 12 chars, 6 dots each minus trailing gap, 4px dots
        assert!((w - (12.0 * 6.0 - 1.0) * 4.0).abs() < 1e-9);
        assert!((h - 28.0).abs() < 1e-9);
    }

    #[test]
    fn generic_follows_family_name() {
        assert_eq!(generic_for("Courier New"), "monospace");
        assert_eq!(generic_for("JetBrains Mono"), "monospace");
        assert_eq!(generic_for("Times New Roman"), "serif");
        assert_eq!(generic_for("PT Sans Serif"), "sans-serif");
        assert_eq!(generic_for("Arial"), "sans-serif");
    }

    #[test]
    fn isolated_book_resolves_only_registered() {
        let book = FontBook::isolated();
        assert!(!book.system_fonts());
        assert!(!book.resolves("Arial"));
        assert!(FontBook::new().resolves("Arial"));
    }

    #[test]
    fn toggling_system_fonts_is_idempotent() {
        let mut book = FontBook::isolated();
        book.set_system_fonts(false).unwrap();
        assert!(!book.system_fonts());
        book.set_system_fonts(true).unwrap();
        assert!(book.system_fonts());
    }
}
